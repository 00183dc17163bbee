use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice,
        handlers::auth::authenticate,
    ),
    tags(
        (name = "invoices", description = "Dashboard invoice forms"),
        (name = "auth", description = "Credentials sign-in"),
    )
)]
pub struct ApiDoc;
