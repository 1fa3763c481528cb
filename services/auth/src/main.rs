use std::sync::Arc;

use anyhow::Result;
use auth::{
    AppState, AuthConfig,
    mailer::LogMailer,
    otp::RedisOtpStore,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    routes,
};
use budget::BudgetService;
use budget::notify::{DisabledPush, ExpoPushClient, PushSender};
use budget::store::PgBudgetStore;
use common::cache::{RedisConfig, RedisPool};
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

    info!("Starting authentication service");

    let config = AuthConfig::load()?;

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

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let push: Arc<dyn PushSender> = if config.push_enabled {
        Arc::new(ExpoPushClient::new(config.push_endpoint.clone())?)
    } else {
        Arc::new(DisabledPush)
    };

    let app_state = AppState {
        budget: BudgetService::new(Arc::new(PgBudgetStore::new(pool)), push),
        otp_store: Arc::new(RedisOtpStore::new(redis_pool)),
        mailer: Arc::new(LogMailer),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        otp_ttl_seconds: config.otp_ttl_seconds,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
