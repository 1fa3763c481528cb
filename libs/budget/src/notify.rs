//! Push transport contract and the Expo implementation
//!
//! Delivery is best-effort. Callers hand messages to [`dispatch`], which runs
//! the send on its own task and only logs failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default Expo push endpoint
pub const EXPO_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// A push notification addressed to one device token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
}

impl PushMessage {
    pub fn new(to: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Push delivery failure
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Push transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Push rejected with status {status}: {reason}")]
    Rejected { status: u16, reason: String },
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

/// Send `message` on a background task, logging instead of propagating failures
pub fn dispatch(sender: Arc<dyn PushSender>, message: PushMessage) -> JoinHandle<()> {
    tokio::spawn(async move {
        match sender.send(&message).await {
            Ok(()) => debug!(title = %message.title, "Push notification delivered"),
            Err(e) => warn!(title = %message.title, error = %e, "Push notification failed"),
        }
    })
}

#[derive(Serialize)]
struct ExpoPayload<'a> {
    to: &'a str,
    sound: &'static str,
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct ExpoResponse {
    data: Option<ExpoTicket>,
}

#[derive(Deserialize)]
struct ExpoTicket {
    status: String,
    message: Option<String>,
}

/// Expo push service client
#[derive(Debug, Clone)]
pub struct ExpoPushClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ExpoPushClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let endpoint = endpoint.into();
        info!("Expo push client targeting {}", endpoint);
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PushSender for ExpoPushClient {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let payload = ExpoPayload {
            to: &message.to,
            sound: "default",
            title: &message.title,
            body: &message.body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        // Expo answers 200 even for per-message errors.
        let ticket = response.json::<ExpoResponse>().await?.data;
        match ticket {
            Some(ticket) if ticket.status == "error" => Err(PushError::Rejected {
                status: status.as_u16(),
                reason: ticket.message.unwrap_or_else(|| "unknown".to_string()),
            }),
            _ => Ok(()),
        }
    }
}

/// Push sender for deployments without a push transport
#[derive(Debug, Clone, Default)]
pub struct DisabledPush;

#[async_trait]
impl PushSender for DisabledPush {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        debug!(title = %message.title, "Push disabled, dropping notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Failing;

    #[async_trait]
    impl PushSender for Failing {
        async fn send(&self, _message: &PushMessage) -> Result<(), PushError> {
            Err(PushError::Rejected {
                status: 400,
                reason: "DeviceNotRegistered".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<PushMessage>>);

    #[async_trait]
    impl PushSender for Recording {
        async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        let handle = dispatch(Arc::new(Failing), PushMessage::new("token", "t", "b"));
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn dispatch_delivers_in_background() {
        let sender = Arc::new(Recording::default());
        dispatch(sender.clone(), PushMessage::new("ExponentPushToken[x]", "Hi", "There"))
            .await
            .unwrap();
        let sent = sender.0.lock().unwrap();
        assert_eq!(sent.as_slice(), &[PushMessage::new("ExponentPushToken[x]", "Hi", "There")]);
    }

    #[test]
    fn expo_payload_shape() {
        let payload = ExpoPayload {
            to: "ExponentPushToken[x]",
            sound: "default",
            title: "Budget running low",
            body: "You have spent 80% of your salary.",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["sound"], "default");
        assert_eq!(json["to"], "ExponentPushToken[x]");
    }

    #[test]
    fn client_builds_with_custom_endpoint() {
        let client = ExpoPushClient::new("http://localhost:9999/push").unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/push");
    }
}
