use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use invoice_service::application::invoice_service::InvoiceService;
use invoice_service::config::Config;
use invoice_service::infrastructure::invoice_repo::DieselInvoiceRepository;
use invoice_service::infrastructure::signin::HttpSignIn;
use invoice_service::infrastructure::view_cache::ViewCache;
use invoice_service::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let invoices = InvoiceService::new(
        Arc::new(DieselInvoiceRepository::new(pool)),
        Arc::new(ViewCache::new()),
    );
    let sign_in = HttpSignIn::new(config.sign_in_url.clone()).map_err(io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(invoices, Arc::new(sign_in), &config.host, config.port)?.await
}
