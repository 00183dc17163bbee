/// Fields of a submitted `application/x-www-form-urlencoded` body, in the
/// order they were sent. Repeated keys are kept; lookups see the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Keys not listed in `allowed`, each reported once.
    pub fn unexpected_keys<'a>(&'a self, allowed: &[&str]) -> Vec<&'a str> {
        let mut unexpected: Vec<&str> = Vec::new();
        for (key, _) in &self.pairs {
            if !allowed.contains(&key.as_str()) && !unexpected.contains(&key.as_str()) {
                unexpected.push(key);
            }
        }
        unexpected
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
