use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::form::FormData;
use crate::domain::invoice::{Invoice, NewInvoice};
use crate::domain::ports::InvoiceRepository;
use crate::domain::validation::{validate_invoice_form, FieldErrors};
use crate::infrastructure::view_cache::ViewCache;

/// Path of the invoice list view; invalidated by every successful write.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

const CREATE_INVALID: &str = "Missing fields. Failed to create invoice.";
const UPDATE_INVALID: &str = "Missing fields. Failed to update invoice.";
const CREATE_FAILED: &str = "Database Error: Failed to Create Invoice.";
const UPDATE_FAILED: &str = "Database Error: Failed to Update Invoice.";
const DELETE_FAILED: &str = "Database Error: Failed to Delete Invoice.";

/// What a form submitted to an invoice action gets back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
}

impl FormState {
    fn invalid(errors: FieldErrors, message: &str) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.to_string()),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            errors: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Write succeeded; send the browser here.
    Redirect(&'static str),
    /// Write succeeded; nothing to return.
    Done,
    /// Form rejected before anything was written.
    Invalid(FormState),
    /// The database refused the write.
    Failed(FormState),
}

/// One page of the invoice list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePage {
    pub items: Vec<Invoice>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

pub struct InvoiceService {
    repo: Arc<dyn InvoiceRepository>,
    views: Arc<ViewCache<InvoicePage>>,
}

impl InvoiceService {
    pub fn new(repo: Arc<dyn InvoiceRepository>, views: Arc<ViewCache<InvoicePage>>) -> Self {
        Self { repo, views }
    }

    pub fn create_invoice(&self, form: &FormData) -> ActionResult {
        let input = match validate_invoice_form(form) {
            Ok(input) => input,
            Err(errors) => {
                log::debug!("Rejected invoice form: {:?}", errors);
                return ActionResult::Invalid(FormState::invalid(errors, CREATE_INVALID));
            }
        };

        let invoice = NewInvoice {
            customer_id: input.customer_id,
            amount: input.amount,
            status: input.status,
            date: Utc::now().date_naive(),
        };
        match self.repo.create(invoice) {
            Ok(id) => log::info!("Created invoice {}", id),
            Err(e) => {
                log::error!("Failed to create invoice: {}", e);
                return ActionResult::Failed(FormState::failed(CREATE_FAILED));
            }
        }

        self.views.revalidate_path(INVOICES_PATH);
        ActionResult::Redirect(INVOICES_PATH)
    }

    /// Replace customer, amount and status of invoice `id`.
    ///
    /// An `id` that matches no invoice is not an error; it is logged and
    /// treated as a successful update.
    pub fn update_invoice(&self, id: &str, form: &FormData) -> ActionResult {
        let input = match validate_invoice_form(form) {
            Ok(input) => input,
            Err(errors) => {
                log::debug!("Rejected invoice form for {}: {:?}", id, errors);
                return ActionResult::Invalid(FormState::invalid(errors, UPDATE_INVALID));
            }
        };

        match self.repo.update(id, input) {
            Ok(0) => log::warn!("Update matched no invoice with id {}", id),
            Ok(_) => log::info!("Updated invoice {}", id),
            Err(e) => {
                log::error!("Failed to update invoice {}: {}", id, e);
                return ActionResult::Failed(FormState::failed(UPDATE_FAILED));
            }
        }

        self.views.revalidate_path(INVOICES_PATH);
        ActionResult::Redirect(INVOICES_PATH)
    }

    pub fn delete_invoice(&self, id: &str) -> ActionResult {
        match self.repo.delete(id) {
            Ok(0) => log::warn!("Delete matched no invoice with id {}", id),
            Ok(_) => log::info!("Deleted invoice {}", id),
            Err(e) => {
                log::error!("Failed to delete invoice {}: {}", id, e);
                return ActionResult::Failed(FormState::failed(DELETE_FAILED));
            }
        }

        self.views.revalidate_path(INVOICES_PATH);
        ActionResult::Done
    }

    pub fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Serve a page of the list view, from cache when it is still valid.
    ///
    /// Only pages up to the last one holding rows are cached, and a page read
    /// while a write revalidated the list is returned but not stored.
    pub fn list_invoices(&self, page: i64, limit: i64) -> Result<InvoicePage, DomainError> {
        let variant = format!("page={page}&limit={limit}");
        if let Some(cached) = self.views.get(INVOICES_PATH, &variant) {
            return Ok(cached);
        }

        let generation = self.views.generation(INVOICES_PATH);
        let result = self.repo.list(page, limit)?;
        let view = InvoicePage {
            items: result.items,
            total: result.total,
            page,
            limit,
        };
        if page <= last_page(view.total, limit) {
            self.views.put_if_current(INVOICES_PATH, &variant, generation, view.clone());
        }
        Ok(view)
    }
}

/// Number of the last page; an empty list still has page 1.
fn last_page(total: i64, limit: i64) -> i64 {
    let limit = limit.max(1);
    (total.saturating_add(limit - 1) / limit).max(1)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::invoice::{InvoiceInput, InvoiceStatus, ListResult};
    use crate::domain::validation::{AMOUNT, STATUS};

    #[derive(Default)]
    struct RecordingRepo {
        fail: bool,
        created: Mutex<Vec<NewInvoice>>,
        updated: Mutex<Vec<(String, InvoiceInput)>>,
        deleted: Mutex<Vec<String>>,
        list_calls: Mutex<usize>,
    }

    impl RecordingRepo {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), DomainError> {
            if self.fail {
                Err(DomainError::Internal("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn writes(&self) -> usize {
            self.created.lock().unwrap().len()
                + self.updated.lock().unwrap().len()
                + self.deleted.lock().unwrap().len()
        }
    }

    impl InvoiceRepository for RecordingRepo {
        fn create(&self, invoice: NewInvoice) -> Result<String, DomainError> {
            self.check()?;
            self.created.lock().unwrap().push(invoice);
            Ok("inv-1".to_string())
        }

        fn update(&self, id: &str, changes: InvoiceInput) -> Result<usize, DomainError> {
            self.check()?;
            self.updated.lock().unwrap().push((id.to_string(), changes));
            Ok(usize::from(id == "inv-1"))
        }

        fn delete(&self, id: &str) -> Result<usize, DomainError> {
            self.check()?;
            self.deleted.lock().unwrap().push(id.to_string());
            Ok(1)
        }

        fn find_by_id(&self, _id: &str) -> Result<Option<Invoice>, DomainError> {
            self.check()?;
            Ok(None)
        }

        fn list(&self, _page: i64, _limit: i64) -> Result<ListResult, DomainError> {
            self.check()?;
            *self.list_calls.lock().unwrap() += 1;
            Ok(ListResult {
                items: vec![Invoice {
                    id: "inv-1".to_string(),
                    customer_id: "c1".to_string(),
                    amount: 1250,
                    status: InvoiceStatus::Pending,
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                }],
                total: 1,
            })
        }
    }

    fn setup(repo: Arc<RecordingRepo>) -> (InvoiceService, Arc<ViewCache<InvoicePage>>) {
        let views = Arc::new(ViewCache::new());
        (InvoiceService::new(repo, views.clone()), views)
    }

    fn cached_page() -> InvoicePage {
        InvoicePage {
            items: vec![],
            total: 0,
            page: 1,
            limit: 20,
        }
    }

    fn form(customer_id: &str, amount: &str, status: &str) -> FormData {
        [
            ("customerId", customer_id),
            ("amount", amount),
            ("status", status),
        ]
        .into_iter()
        .collect()
    }

    fn expect_invalid(result: ActionResult) -> FormState {
        match result {
            ActionResult::Invalid(state) => state,
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn create_writes_minor_units_and_today_then_redirects() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, views) = setup(repo.clone());
        views.put(INVOICES_PATH, "page=1&limit=20", cached_page());
        let before = Utc::now().date_naive();

        let result = service.create_invoice(&form("c1", "12.50", "pending"));

        let after = Utc::now().date_naive();
        assert_eq!(result, ActionResult::Redirect(INVOICES_PATH));
        let created = repo.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].customer_id, "c1");
        assert_eq!(created[0].amount, 1250);
        assert_eq!(created[0].status, InvoiceStatus::Pending);
        assert!(created[0].date == before || created[0].date == after);
        assert_eq!(views.get(INVOICES_PATH, "page=1&limit=20"), None);
    }

    #[test]
    fn non_positive_amount_is_rejected_without_write() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo.clone());

        for amount in ["0", "-12.50"] {
            let state = expect_invalid(service.create_invoice(&form("c1", amount, "paid")));
            assert!(state.errors.as_ref().unwrap().contains(AMOUNT));
            assert_eq!(state.message.as_deref(), Some(CREATE_INVALID));

            let state = expect_invalid(service.update_invoice("inv-1", &form("c1", amount, "paid")));
            assert!(state.errors.as_ref().unwrap().contains(AMOUNT));
            assert_eq!(state.message.as_deref(), Some(UPDATE_INVALID));
        }
        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn unknown_status_is_rejected_without_write() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo.clone());

        let state = expect_invalid(service.create_invoice(&form("c1", "10", "overdue")));
        assert!(state.errors.as_ref().unwrap().contains(STATUS));

        let state = expect_invalid(service.update_invoice("inv-1", &form("c1", "10", "")));
        assert!(state.errors.as_ref().unwrap().contains(STATUS));

        assert_eq!(repo.writes(), 0);
    }

    #[test]
    fn database_failure_returns_generic_message_and_keeps_cache() {
        let repo = Arc::new(RecordingRepo::failing());
        let (service, views) = setup(repo);
        views.put(INVOICES_PATH, "page=1&limit=20", cached_page());

        assert_eq!(
            service.create_invoice(&form("c1", "12.50", "pending")),
            ActionResult::Failed(FormState {
                errors: None,
                message: Some("Database Error: Failed to Create Invoice.".to_string()),
            })
        );
        assert_eq!(
            service.update_invoice("inv-1", &form("c1", "12.50", "pending")),
            ActionResult::Failed(FormState {
                errors: None,
                message: Some("Database Error: Failed to Update Invoice.".to_string()),
            })
        );
        assert!(views.get(INVOICES_PATH, "page=1&limit=20").is_some());
    }

    #[test]
    fn update_writes_by_id_and_redirects() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo.clone());

        let result = service.update_invoice("inv-1", &form("c2", "3", "paid"));

        assert_eq!(result, ActionResult::Redirect(INVOICES_PATH));
        let updated = repo.updated.lock().unwrap();
        assert_eq!(
            updated[0],
            (
                "inv-1".to_string(),
                InvoiceInput {
                    customer_id: "c2".to_string(),
                    amount: 300,
                    status: InvoiceStatus::Paid,
                }
            )
        );
    }

    #[test]
    fn update_of_unknown_id_still_redirects() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo);

        let result = service.update_invoice("missing", &form("c2", "3", "paid"));

        assert_eq!(result, ActionResult::Redirect(INVOICES_PATH));
    }

    #[test]
    fn delete_removes_and_revalidates_without_redirect() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, views) = setup(repo.clone());
        views.put(INVOICES_PATH, "page=1&limit=20", cached_page());

        assert_eq!(service.delete_invoice("inv-1"), ActionResult::Done);
        assert_eq!(*repo.deleted.lock().unwrap(), vec!["inv-1".to_string()]);
        assert_eq!(views.get(INVOICES_PATH, "page=1&limit=20"), None);
    }

    #[test]
    fn delete_failure_returns_generic_message() {
        let repo = Arc::new(RecordingRepo::failing());
        let (service, views) = setup(repo);
        views.put(INVOICES_PATH, "page=1&limit=20", cached_page());

        assert_eq!(
            service.delete_invoice("inv-1"),
            ActionResult::Failed(FormState {
                errors: None,
                message: Some("Database Error: Failed to Delete Invoice.".to_string()),
            })
        );
        assert!(views.get(INVOICES_PATH, "page=1&limit=20").is_some());
    }

    #[test]
    fn list_is_served_from_cache_until_a_write() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo.clone());

        let first = service.list_invoices(1, 20).expect("list failed");
        let second = service.list_invoices(1, 20).expect("list failed");
        assert_eq!(first, second);
        assert_eq!(*repo.list_calls.lock().unwrap(), 1);

        service.delete_invoice("inv-1");
        service.list_invoices(1, 20).expect("list failed");
        assert_eq!(*repo.list_calls.lock().unwrap(), 2);
    }

    /// Commits a write and revalidates the list while a list query is running.
    struct WriteDuringListRepo {
        views: Arc<ViewCache<InvoicePage>>,
        rows: Mutex<i64>,
    }

    impl InvoiceRepository for WriteDuringListRepo {
        fn create(&self, _invoice: NewInvoice) -> Result<String, DomainError> {
            Ok("inv-1".to_string())
        }

        fn update(&self, _id: &str, _changes: InvoiceInput) -> Result<usize, DomainError> {
            Ok(0)
        }

        fn delete(&self, _id: &str) -> Result<usize, DomainError> {
            Ok(0)
        }

        fn find_by_id(&self, _id: &str) -> Result<Option<Invoice>, DomainError> {
            Ok(None)
        }

        fn list(&self, _page: i64, _limit: i64) -> Result<ListResult, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let seen = *rows;
            if seen == 0 {
                *rows += 1;
                self.views.revalidate_path(INVOICES_PATH);
            }
            Ok(ListResult {
                items: vec![],
                total: seen,
            })
        }
    }

    #[test]
    fn list_read_during_a_write_is_not_cached() {
        let views = Arc::new(ViewCache::new());
        let repo = Arc::new(WriteDuringListRepo {
            views: views.clone(),
            rows: Mutex::new(0),
        });
        let service = InvoiceService::new(repo, views);

        let first = service.list_invoices(1, 20).expect("list failed");
        assert_eq!(first.total, 0);

        let second = service.list_invoices(1, 20).expect("list failed");
        assert_eq!(second.total, 1);
    }

    #[test]
    fn pages_past_the_last_are_not_cached() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, views) = setup(repo.clone());

        for _ in 0..2 {
            let page = service.list_invoices(7, 20).expect("list failed");
            assert_eq!(page.total, 1);
        }

        assert_eq!(*repo.list_calls.lock().unwrap(), 2);
        assert_eq!(views.get(INVOICES_PATH, "page=7&limit=20"), None);
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(last_page(0, 20), 1);
        assert_eq!(last_page(20, 20), 1);
        assert_eq!(last_page(21, 20), 2);
    }

    #[test]
    fn list_pages_are_cached_separately() {
        let repo = Arc::new(RecordingRepo::default());
        let (service, _) = setup(repo.clone());

        service.list_invoices(1, 20).expect("list failed");
        service.list_invoices(2, 20).expect("list failed");

        assert_eq!(*repo.list_calls.lock().unwrap(), 2);
    }
}
