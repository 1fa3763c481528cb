//! User account as seen by the budget core

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
///
/// Rows are owned by the auth service. The core reads the salary baseline,
/// the push token and the current-cycle pointer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub salary: Decimal,
    pub push_token: Option<String>,
    pub current_cycle_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// New account creation payload, password already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub salary: Decimal,
    pub push_token: Option<String>,
}
