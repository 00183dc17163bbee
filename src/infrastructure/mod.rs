pub mod invoice_repo;
pub mod models;
pub mod signin;
pub mod view_cache;
