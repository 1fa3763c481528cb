//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use budget::models::NewAccount;
use budget::notify::{self, PushMessage};
use tracing::{error, info, warn};

use crate::{
    AppState,
    middleware::request_logger,
    error::{AuthError, AuthResult},
    mailer::OutgoingMail,
    models::{
        LoginRequest, LoginResponse, LoginUser, MessageResponse, RegisteredResponse,
        SendOtpRequest, VerifyOtpRequest,
    },
    otp, password,
    validation::{
        normalize_email, validate_email, validate_full_name, validate_otp, validate_password,
    },
};

type JsonBody<T> = WithRejection<Json<T>, AuthError>;

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/send-otp", post(send_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
        .layer(middleware::from_fn(request_logger))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

fn required<T>(value: Option<T>, message: &str) -> AuthResult<T> {
    value.ok_or_else(|| AuthError::BadRequest(message.to_string()))
}

fn checked_email(raw: Option<String>) -> AuthResult<String> {
    let email = normalize_email(&required(raw, "Email is required")?);
    validate_email(&email).map_err(AuthError::BadRequest)?;
    Ok(email)
}

async fn throttle(state: &AppState, action: &str, email: &str) -> AuthResult<()> {
    if state.rate_limiter.is_allowed(action, email).await {
        Ok(())
    } else {
        warn!(action, email, "Rate limit exceeded");
        Err(AuthError::TooManyRequests)
    }
}

/// Issue a signup code and mail it
pub async fn send_otp(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<SendOtpRequest>,
) -> AuthResult<impl IntoResponse> {
    let email = checked_email(payload.email)?;
    throttle(&state, "send-otp", &email).await?;

    let code = otp::generate_code();
    state
        .otp_store
        .issue(&email, &code, state.otp_ttl_seconds)
        .await
        .map_err(|e| {
            error!("Failed to store OTP: {}", e);
            AuthError::InternalServerError
        })?;

    if let Err(e) = state.mailer.send(&OutgoingMail::otp(&email, &code)).await {
        error!("Failed to send OTP mail: {}", e);
        if let Err(e) = state.otp_store.consume(&email).await {
            warn!("Failed to discard undelivered OTP: {}", e);
        }
        return Err(AuthError::InternalServerError);
    }

    info!("OTP issued for {}", email);
    Ok(Json(MessageResponse {
        message: "OTP sent successfully",
    }))
}

/// Check the signup code, then create the account and its first cycle
pub async fn verify_otp(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<VerifyOtpRequest>,
) -> AuthResult<impl IntoResponse> {
    let email = checked_email(payload.email)?;
    throttle(&state, "verify-otp", &email).await?;

    let submitted = required(payload.otp, "OTP is required")?.normalized();
    validate_otp(&submitted).map_err(AuthError::BadRequest)?;
    let pending = state.otp_store.pending(&email).await.map_err(|e| {
        error!("Failed to read OTP: {}", e);
        AuthError::InternalServerError
    })?;
    match pending {
        None => return Err(AuthError::BadRequest("OTP expired or not sent".to_string())),
        Some(code) if code != submitted => {
            return Err(AuthError::BadRequest("Invalid OTP".to_string()));
        }
        Some(_) => {}
    }

    let full_name = required(payload.full_name, "Full name is required")?
        .trim()
        .to_string();
    validate_full_name(&full_name).map_err(AuthError::BadRequest)?;
    let plain_password = required(payload.password, "Password is required")?;
    validate_password(&plain_password).map_err(AuthError::BadRequest)?;
    let salary = required(payload.salary, "Salary is required")?;
    let push_token = payload
        .expo_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if state.budget.find_account_by_email(&email).await?.is_some() {
        return Err(AuthError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&plain_password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::InternalServerError
    })?;

    let user = state
        .budget
        .register_account(NewAccount {
            full_name: full_name.clone(),
            email: email.clone(),
            password_hash,
            salary,
            push_token: push_token.clone(),
        })
        .await?;
    info!(user_id = %user.id, "Account registered");

    if let Err(e) = state.otp_store.consume(&email).await {
        warn!("Failed to discard used OTP: {}", e);
    }
    state.rate_limiter.reset("verify-otp", &email).await;

    if let Err(e) = state
        .mailer
        .send(&OutgoingMail::welcome(&email, &full_name))
        .await
    {
        warn!(user_id = %user.id, "Failed to send welcome mail: {}", e);
    }
    if let Some(token) = push_token {
        notify::dispatch(
            state.budget.push().clone(),
            PushMessage::new(token, "Welcome", "Signup successful! Enjoy using the app."),
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

/// Password login; optionally registers a new device push token
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(raw_email), Some(plain_password)) = (payload.email, payload.password) else {
        return Err(AuthError::BadRequest("All fields required".to_string()));
    };
    let email = normalize_email(&raw_email);
    throttle(&state, "login", &email).await?;

    let invalid = || AuthError::Unauthorized("Invalid credentials".to_string());
    let user = state
        .budget
        .find_account_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let valid = password::verify_password(&plain_password, &user.password_hash).map_err(|e| {
        error!(user_id = %user.id, "Stored password hash is unusable: {}", e);
        AuthError::InternalServerError
    })?;
    if !valid {
        info!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }
    state.rate_limiter.reset("login", &email).await;

    let new_token = payload
        .expo_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(token) = &new_token {
        state.budget.update_push_token(user.id, token).await?;
    }
    if let Some(token) = new_token.or(user.push_token) {
        notify::dispatch(
            state.budget.push().clone(),
            PushMessage::new(
                token,
                "Login Successful",
                format!("Welcome back, {}!", user.full_name),
            ),
        );
    }

    info!(user_id = %user.id, "Login successful");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: LoginUser {
            id: user.id,
            name: user.full_name,
            salary: user.salary,
            email: user.email,
        },
    }))
}
