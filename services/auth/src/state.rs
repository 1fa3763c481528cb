//! Application state shared across handlers

use std::sync::Arc;

use budget::BudgetService;

use crate::mailer::Mailer;
use crate::otp::OtpStore;
use crate::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub budget: BudgetService,
    pub otp_store: Arc<dyn OtpStore>,
    pub mailer: Arc<dyn Mailer>,
    pub rate_limiter: RateLimiter,
    pub otp_ttl_seconds: u64,
}
