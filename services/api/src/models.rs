//! Request and response payloads

use budget::ExpenseReceipt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Body of `POST /user/reload-salary`
#[derive(Debug, Deserialize)]
pub struct ReloadSalaryRequest {
    pub user_id: Option<Uuid>,
}

/// Body of `POST /user/update-salary`
#[derive(Debug, Deserialize)]
pub struct UpdateSalaryRequest {
    pub user_id: Option<Uuid>,
    pub salary: Option<Decimal>,
}

/// Body of `POST /notifications/add`
#[derive(Debug, Deserialize)]
pub struct AddNotificationRequest {
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub message: Option<String>,
}

/// Query of `DELETE /expenses/:id`
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AddExpenseResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: ExpenseReceipt,
}

#[derive(Debug, Serialize)]
pub struct ReloadSalaryResponse {
    pub message: &'static str,
    pub cycle_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Unwrap a required payload field or answer 400
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}
