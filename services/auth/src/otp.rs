//! One-time signup codes
//!
//! Codes are four digits and expire after the configured TTL. In production
//! they live in Redis under `otp:<email>`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use common::cache::RedisPool;
use rand::Rng;
use tokio::sync::Mutex;

/// Generate a four-digit code
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

fn key(email: &str) -> String {
    format!("otp:{email}")
}

/// Storage for pending signup codes, keyed by normalized email
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store `code` for `email`, replacing any pending one
    async fn issue(&self, email: &str, code: &str, ttl_seconds: u64) -> Result<()>;

    /// Pending code for `email`, if one exists and has not expired
    async fn pending(&self, email: &str) -> Result<Option<String>>;

    async fn consume(&self, email: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisOtpStore {
    redis: RedisPool,
}

impl RedisOtpStore {
    pub fn new(redis: RedisPool) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn issue(&self, email: &str, code: &str, ttl_seconds: u64) -> Result<()> {
        self.redis.set(&key(email), code, Some(ttl_seconds)).await
    }

    async fn pending(&self, email: &str) -> Result<Option<String>> {
        self.redis.get(&key(email)).await
    }

    async fn consume(&self, email: &str) -> Result<()> {
        self.redis.delete(&key(email)).await
    }
}

/// Process-local code store for tests and single-node development
#[derive(Debug, Clone, Default)]
pub struct MemoryOtpStore {
    codes: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn issue(&self, email: &str, code: &str, ttl_seconds: u64) -> Result<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        self.codes
            .lock()
            .await
            .insert(key(email), (code.to_string(), expires));
        Ok(())
    }

    async fn pending(&self, email: &str) -> Result<Option<String>> {
        let mut codes = self.codes.lock().await;
        let key = key(email);
        let expired = matches!(codes.get(&key), Some((_, expires)) if Instant::now() >= *expires);
        if expired {
            codes.remove(&key);
            return Ok(None);
        }
        Ok(codes.get(&key).map(|(code, _)| code.clone()))
    }

    async fn consume(&self, email: &str) -> Result<()> {
        self.codes.lock().await.remove(&key(email));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_four_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_memory_store_replaces_and_consumes() -> Result<()> {
        let store = MemoryOtpStore::new();
        store.issue("a@example.com", "1111", 60).await?;
        store.issue("a@example.com", "2222", 60).await?;
        assert_eq!(store.pending("a@example.com").await?, Some("2222".to_string()));

        store.consume("a@example.com").await?;
        assert_eq!(store.pending("a@example.com").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_expires_codes() -> Result<()> {
        let store = MemoryOtpStore::new();
        store.issue("b@example.com", "3333", 0).await?;
        assert_eq!(store.pending("b@example.com").await?, None);
        Ok(())
    }
}
