use std::sync::Arc;

use anyhow::Result;
use api::{ApiConfig, AppState, routes};
use budget::BudgetService;
use budget::notify::{DisabledPush, ExpoPushClient, PushSender};
use budget::store::PgBudgetStore;
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let config = ApiConfig::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;

    let push: Arc<dyn PushSender> = if config.push_enabled {
        Arc::new(ExpoPushClient::new(config.push_endpoint.clone())?)
    } else {
        info!("Push notifications disabled");
        Arc::new(DisabledPush)
    };
    let budget = BudgetService::new(Arc::new(PgBudgetStore::new(pool)), push);

    // Start the web server
    let app = routes::create_router(AppState::new(budget));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
