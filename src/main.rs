use medstock::config::AppConfig;
use medstock::entities::seed_demo_data;
use medstock::server::ServerBuilder;
use medstock::storage::open_store;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("medstock=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;

    // A failed connection still serves health checks; data routes answer
    // 500 STORE_UNAVAILABLE
    let store = match open_store(&config.storage).await {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!(
                backend = ?config.storage.backend,
                "failed to open document store: {}",
                e
            );
            None
        }
    };

    if config.storage.seed_demo_data
        && let Some(store) = &store
    {
        // The driver may connect lazily, so an unreachable store shows up here
        if let Err(e) = seed_demo_data(store.clone(), &config.auth.demo_user).await {
            tracing::error!(code = e.error_code(), "failed to seed demo data: {}", e);
        }
    }

    ServerBuilder::new()
        .with_shared_store(store)
        .with_shared_auth_provider(config.auth.provider())
        .with_dashboard_settings(config.dashboard.settings())
        .serve(&config.server.address())
        .await
}
