use dotenvy::dotenv;
use storefront_admin::{
    api::{self, AppState},
    config::{database, settings},
    core::category,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Initialize database
    let db = database::init_database(&database::get_database_url())
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed configured categories
    category::seed_categories(&db, &app_config.categories)
        .await
        .inspect(|created| info!("Seeded {} new categories.", created))
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    // 6. Serve the API until Ctrl-C
    let app = api::router(AppState::new(db, app_config.server.max_adjust_retries));
    let listener = tokio::net::TcpListener::bind(&app_config.server.bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.server.bind_address, e))?;
    info!("Listening on {}", app_config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
