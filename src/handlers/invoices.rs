use actix_web::{http::header, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::invoice_service::{ActionResult, InvoicePage, InvoiceService};
use crate::domain::form::FormData;
use crate::domain::invoice::Invoice;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Fields of the create and edit invoice forms, for the API docs only.
/// Handlers read the raw form pairs and validate them in the domain layer.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub customer_id: String,
    /// Decimal amount in major units, e.g. "12.50"
    pub amount: String,
    /// Either "pending" or "paid"
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: String,
    pub customer_id: String,
    /// Amount in minor units (cents)
    pub amount: i32,
    pub status: String,
    pub date: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: invoice.amount,
            status: invoice.status.as_str().to_string(),
            date: invoice.date.to_string(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListInvoicesParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListInvoicesResponse {
    pub items: Vec<InvoiceResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl From<InvoicePage> for ListInvoicesResponse {
    fn from(page: InvoicePage) -> Self {
        Self {
            items: page.items.into_iter().map(InvoiceResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

fn action_response(result: ActionResult) -> HttpResponse {
    match result {
        ActionResult::Redirect(location) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, location))
            .finish(),
        ActionResult::Done => HttpResponse::NoContent().finish(),
        ActionResult::Invalid(state) => HttpResponse::UnprocessableEntity().json(state),
        ActionResult::Failed(state) => HttpResponse::InternalServerError().json(state),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /dashboard/invoices
///
/// Validates the form, inserts one invoice dated today and redirects to the
/// invoice list.
#[utoipa::path(
    post,
    path = "/dashboard/invoices",
    request_body(content = InvoiceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Invoice created; redirect to the invoice list"),
        (status = 422, description = "Form rejected; field errors and message"),
        (status = 500, description = "Database error"),
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    service: web::Data<InvoiceService>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let form = FormData::from(form.into_inner());
    let service = service.into_inner();

    let result = web::block(move || service.create_invoice(&form)).await?;

    Ok(action_response(result))
}

/// POST /dashboard/invoices/{id}/edit
///
/// Replaces customer, amount and status. The issue date never changes.
#[utoipa::path(
    post,
    path = "/dashboard/invoices/{id}/edit",
    params(
        ("id" = String, Path, description = "Invoice identifier"),
    ),
    request_body(content = InvoiceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Invoice updated; redirect to the invoice list"),
        (status = 422, description = "Form rejected; field errors and message"),
        (status = 500, description = "Database error"),
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    service: web::Data<InvoiceService>,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let form = FormData::from(form.into_inner());
    let service = service.into_inner();

    let result = web::block(move || service.update_invoice(&id, &form)).await?;

    Ok(action_response(result))
}

/// POST /dashboard/invoices/{id}/delete
#[utoipa::path(
    post,
    path = "/dashboard/invoices/{id}/delete",
    params(
        ("id" = String, Path, description = "Invoice identifier"),
    ),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 500, description = "Database error"),
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    service: web::Data<InvoiceService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = service.into_inner();

    let result = web::block(move || service.delete_invoice(&id)).await?;

    Ok(action_response(result))
}

/// GET /dashboard/invoices/{id}
#[utoipa::path(
    get,
    path = "/dashboard/invoices/{id}",
    params(
        ("id" = String, Path, description = "Invoice identifier"),
    ),
    responses(
        (status = 200, description = "Invoice found", body = InvoiceResponse),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    service: web::Data<InvoiceService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = service.into_inner();

    let invoice = web::block(move || service.get_invoice(&id)).await??;

    match invoice {
        Some(invoice) => Ok(HttpResponse::Ok().json(InvoiceResponse::from(invoice))),
        None => Err(AppError::NotFound),
    }
}

/// GET /dashboard/invoices
///
/// Returns a page of invoices, newest first. Pages are cached until the next
/// create, update or delete.
#[utoipa::path(
    get,
    path = "/dashboard/invoices",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of invoices", body = ListInvoicesResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    service: web::Data<InvoiceService>,
    query: web::Query<ListInvoicesParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let service = service.into_inner();

    let result = web::block(move || service.list_invoices(page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListInvoicesResponse::from(result)))
}
