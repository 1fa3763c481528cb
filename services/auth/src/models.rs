//! Request and response payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /send-otp`
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

/// A code submitted either as a JSON string or a number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OtpCode {
    Text(String),
    Number(u32),
}

impl OtpCode {
    /// Codes are four digits, so numeric submissions are zero padded
    pub fn normalized(&self) -> String {
        match self {
            OtpCode::Text(code) => code.trim().to_string(),
            OtpCode::Number(code) => format!("{code:04}"),
        }
    }
}

/// Body of `POST /verify-otp`
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub salary: Option<Decimal>,
    pub password: Option<String>,
    pub otp: Option<OtpCode>,
    pub expo_token: Option<String>,
}

/// Body of `POST /login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub expo_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub name: String,
    pub salary: Decimal,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
