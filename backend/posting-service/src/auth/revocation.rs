//! Revoked session store
//!
//! Logout records the token's `jti` until the token would have expired
//! anyway; the auth middleware rejects any token whose `jti` is recorded.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use tracing::info;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError>;
}

/// Redis-backed store
///
/// **Key format**: `token:revoked:{jti}`
/// **TTL**: seconds until the token expires
pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

fn revocation_key(jti: &str) -> String {
    format!("token:revoked:{}", jti)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let ttl_seconds = (expires_at - Utc::now()).num_seconds();
        if ttl_seconds <= 0 {
            return Ok(());
        }

        let mut conn = self.redis.clone();
        redis::cmd("SET")
            .arg(revocation_key(jti))
            .arg(1)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to revoke session: {}", e)))?;

        info!(jti = %jti, ttl = ttl_seconds, "Session revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let mut conn = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(revocation_key(jti))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to check session revocation: {}", e))
            })?;

        Ok(exists)
    }
}
