use chakachak_office::{
    api::{self, AppState},
    config::{self, AppConfig, database},
    core::reconcile,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    // 3. Resolve configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Bring cached balances back in line with the ledgers
    reconcile::rebuild_all(&db)
        .await
        .inspect_err(|e| error!("Startup reconciliation failed: {}", e))?;

    // 6. Serve
    serve(AppState::new(db, app_config.clone()), &app_config).await
}

#[instrument(skip_all, fields(addr = %config.bind_address))]
async fn serve(state: AppState, config: &AppConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, api::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}
