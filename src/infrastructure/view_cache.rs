use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Rendered views keyed by path, then by variant (e.g. the query string).
///
/// Writers call [`ViewCache::revalidate_path`] after changing the data a
/// path renders, so the next read recomputes it. Each revalidation bumps the
/// path's generation; a view computed under an older generation is never
/// stored by [`ViewCache::put_if_current`].
#[derive(Debug)]
pub struct ViewCache<V> {
    entries: RwLock<HashMap<String, PathViews<V>>>,
}

#[derive(Debug)]
struct PathViews<V> {
    generation: u64,
    variants: HashMap<String, V>,
}

impl<V> Default for PathViews<V> {
    fn default() -> Self {
        Self {
            generation: 0,
            variants: HashMap::new(),
        }
    }
}

impl<V> Default for ViewCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> ViewCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, variant: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path)?.variants.get(variant).cloned()
    }

    /// Current generation of `path`. Read it before computing a view.
    pub fn generation(&self, path: &str) -> u64 {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).map_or(0, |views| views.generation)
    }

    pub fn put(&self, path: &str, variant: &str, view: V) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(path.to_string())
            .or_default()
            .variants
            .insert(variant.to_string(), view);
    }

    /// Store `view` only if `path` has not been revalidated since
    /// `generation` was read. Returns whether the view was stored.
    pub fn put_if_current(&self, path: &str, variant: &str, generation: u64, view: V) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let views = entries.entry(path.to_string()).or_default();
        if views.generation != generation {
            log::debug!("Discarded stale view of {} ({})", path, variant);
            return false;
        }
        views.variants.insert(variant.to_string(), view);
        true
    }

    /// Drop every cached variant of `path`.
    pub fn revalidate_path(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let views = entries.entry(path.to_string()).or_default();
        views.generation = views.generation.wrapping_add(1);
        if !views.variants.is_empty() {
            views.variants.clear();
            log::debug!("Revalidated cached views for {}", path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_misses_until_put() {
        let cache = ViewCache::new();
        assert_eq!(cache.get("/a", "page=1"), None);
        cache.put("/a", "page=1", 7);
        assert_eq!(cache.get("/a", "page=1"), Some(7));
        assert_eq!(cache.get("/a", "page=2"), None);
    }

    #[test]
    fn revalidate_drops_all_variants_of_path_only() {
        let cache = ViewCache::new();
        cache.put("/a", "page=1", 1);
        cache.put("/a", "page=2", 2);
        cache.put("/b", "page=1", 3);

        cache.revalidate_path("/a");

        assert_eq!(cache.get("/a", "page=1"), None);
        assert_eq!(cache.get("/a", "page=2"), None);
        assert_eq!(cache.get("/b", "page=1"), Some(3));
    }

    #[test]
    fn view_computed_before_revalidation_is_not_stored() {
        let cache = ViewCache::new();
        let generation = cache.generation("/a");

        cache.revalidate_path("/a");

        assert!(!cache.put_if_current("/a", "page=1", generation, 1));
        assert_eq!(cache.get("/a", "page=1"), None);

        let generation = cache.generation("/a");
        assert!(cache.put_if_current("/a", "page=1", generation, 2));
        assert_eq!(cache.get("/a", "page=1"), Some(2));
    }

    #[test]
    fn generations_are_tracked_per_path() {
        let cache = ViewCache::new();
        let generation = cache.generation("/b");

        cache.revalidate_path("/a");

        assert_eq!(cache.generation("/b"), generation);
        assert!(cache.put_if_current("/b", "page=1", generation, 3));
    }
}
