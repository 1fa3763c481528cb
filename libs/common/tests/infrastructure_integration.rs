//! Integration tests for the infrastructure components
//!
//! These need a live PostgreSQL and Redis (see `DATABASE_URL` and
//! `REDIS_URL`) and are ignored by default.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    // The schema the budget core relies on must be in place.
    let row = sqlx::query(
        "SELECT COUNT(*)::INT AS tables FROM information_schema.tables \
         WHERE table_name IN ('users', 'salary_cycles', 'expenses', 'notifications', 'cycle_alert_watermarks')",
    )
    .fetch_one(&pool)
    .await?;
    let tables: i32 = row.get("tables");
    assert_eq!(tables, 5, "Migrations did not create every table");

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    assert!(redis_pool.health_check().await?, "Redis health check failed");

    let key = "integration_test_key";
    redis_pool.set(key, "integration_test_value", Some(10)).await?;
    assert_eq!(
        redis_pool.get(key).await?,
        Some("integration_test_value".to_string())
    );
    redis_pool.delete(key).await?;
    assert_eq!(redis_pool.get(key).await?, None);

    Ok(())
}
