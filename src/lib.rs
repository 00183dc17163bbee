pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::error::Error;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::invoice_service::InvoiceService;
use domain::ports::SignIn;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Register the dashboard routes. Expects `web::Data<InvoiceService>` and
/// `web::Data<dyn SignIn>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard/invoices")
            .route("", web::get().to(handlers::invoices::list_invoices))
            .route("", web::post().to(handlers::invoices::create_invoice))
            .route("/{id}", web::get().to(handlers::invoices::get_invoice))
            .route("/{id}/edit", web::post().to(handlers::invoices::update_invoice))
            .route("/{id}/delete", web::post().to(handlers::invoices::delete_invoice)),
    )
    .route("/login", web::post().to(handlers::auth::authenticate));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    invoices: InvoiceService,
    sign_in: Arc<dyn SignIn>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let invoices = web::Data::new(invoices);
    let sign_in: web::Data<dyn SignIn> = web::Data::from(sign_in);
    let api_doc = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(invoices.clone())
            .app_data(sign_in.clone())
            .wrap(Logger::default())
            .configure(configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", api_doc.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
