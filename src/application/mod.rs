pub mod auth;
pub mod invoice_service;
