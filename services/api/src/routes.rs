//! API service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use budget::models::ExpenseDraft;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::request_logger,
    models::{
        AddExpenseResponse, AddNotificationRequest, MessageResponse, OwnerQuery,
        ReloadSalaryRequest, ReloadSalaryResponse, UpdateSalaryRequest, required,
    },
};

type JsonBody<T> = WithRejection<Json<T>, ApiError>;
type UserPath = WithRejection<Path<Uuid>, ApiError>;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/expenses/add", post(add_expense))
        .route("/expenses/summary/:user_id", get(expense_summary))
        .route("/expenses/all/:user_id", get(all_expenses))
        .route("/expenses/categories/:user_id", get(category_summary))
        .route("/expenses/:id", get(current_expenses).delete(delete_expense))
        .route("/cycles/:user_id", get(list_cycles))
        .route("/cycles/:user_id/:cycle_id/expenses", get(cycle_expenses))
        .route("/user/reload-salary", post(reload_salary))
        .route("/user/update-salary", post(update_salary))
        .route("/notifications/add", post(add_notification))
        .route("/notifications/:user_id", get(list_notifications))
        .layer(middleware::from_fn(request_logger))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Append an expense to the owner's current cycle
pub async fn add_expense(
    State(state): State<AppState>,
    WithRejection(Json(draft), _): JsonBody<ExpenseDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state.budget.append_expense(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddExpenseResponse {
            message: "Expense added successfully",
            receipt,
        }),
    ))
}

/// Expenses bound to the user's current cycle
pub async fn current_expenses(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.current_expenses(user_id).await?))
}

/// Delete an expense; the caller must own it
pub async fn delete_expense(
    State(state): State<AppState>,
    WithRejection(Path(id), _): UserPath,
    WithRejection(Query(query), _): WithRejection<Query<OwnerQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = required(query.user_id, "user_id")?;
    state.budget.remove_expense(id, caller).await?;

    Ok(Json(MessageResponse {
        message: "Expense deleted successfully",
    }))
}

/// Salary, spend, remaining budget and percentage of the current cycle
pub async fn expense_summary(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.cycle_summary(user_id).await?))
}

/// Every expense of the user, across cycles
pub async fn all_expenses(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.all_expenses(user_id).await?))
}

/// Current-cycle spend per category
pub async fn category_summary(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.category_summary(user_id).await?))
}

/// All cycles of a user, most recent first, with the current one flagged
pub async fn list_cycles(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.cycle_history(user_id).await?))
}

/// Expenses of one of the user's cycles
pub async fn cycle_expenses(
    State(state): State<AppState>,
    WithRejection(Path((user_id, cycle_id)), _): WithRejection<Path<(Uuid, Uuid)>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.cycle_expenses(user_id, cycle_id).await?))
}

/// Start a new cycle from the user's salary baseline
pub async fn reload_salary(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<ReloadSalaryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(payload.user_id, "user_id")?;
    let cycle = state.budget.reload_cycle(user_id).await?;
    info!(user_id = %user_id, cycle_id = %cycle.id, "Salary cycle reloaded");

    Ok(Json(ReloadSalaryResponse {
        message: "Salary reloaded successfully",
        cycle_id: cycle.id,
    }))
}

/// Change the salary baseline used by the next reload
pub async fn update_salary(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<UpdateSalaryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(payload.user_id, "user_id")?;
    let salary = required(payload.salary, "salary")?;
    state.budget.update_salary(user_id, salary).await?;

    Ok(Json(MessageResponse {
        message: "Salary updated successfully",
    }))
}

/// Append a notification to the user's log
pub async fn add_notification(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<AddNotificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(payload.user_id, "user_id")?;
    let message = required(payload.message, "message")?;
    let record = state
        .budget
        .add_notification(user_id, payload.title, &message)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// Notification log of a user, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): UserPath,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.budget.notifications(user_id).await?))
}
