//! Outbound mail

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn otp(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your OTP Code".to_string(),
            body: format!("Your OTP code is: {code}"),
        }
    }

    pub fn welcome(to: &str, full_name: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Welcome to Salary Tracker".to_string(),
            body: format!("Hi {full_name},\n\nSignup successful! Welcome aboard."),
        }
    }
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Delivers mail to users
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Mailer that only writes outgoing mail to the log
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "Outgoing mail");
        debug!(to = %mail.to, body = %mail.body, "Outgoing mail body");
        Ok(())
    }
}
