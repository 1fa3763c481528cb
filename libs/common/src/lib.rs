//! Shared infrastructure for the salary tracker services
//!
//! This crate holds the pieces every service needs and none of them own:
//! PostgreSQL pooling and migrations, the Redis key-value cache used for
//! short-lived codes, and the storage error type.
//!
//! Start-up sequence shared by the services:
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
