use async_trait::async_trait;

use super::auth::{Provider, SignInError};
use super::errors::DomainError;
use super::form::FormData;
use super::invoice::{Invoice, InvoiceInput, ListResult, NewInvoice};

/// Storage for invoices. Each write is a single statement.
pub trait InvoiceRepository: Send + Sync + 'static {
    /// Insert a new invoice and return its identifier.
    fn create(&self, invoice: NewInvoice) -> Result<String, DomainError>;
    /// Overwrite customer, amount and status. Returns the number of rows changed.
    fn update(&self, id: &str, changes: InvoiceInput) -> Result<usize, DomainError>;
    /// Returns the number of rows removed.
    fn delete(&self, id: &str) -> Result<usize, DomainError>;
    fn find_by_id(&self, id: &str) -> Result<Option<Invoice>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

/// External sign-in capability the login form delegates to.
#[async_trait]
pub trait SignIn: Send + Sync + 'static {
    async fn sign_in(&self, provider: Provider, credentials: &FormData) -> Result<(), SignInError>;
}
