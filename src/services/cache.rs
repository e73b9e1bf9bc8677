//! Redis cache for the pipeline's one hot static read: tenant document
//! templates. Values are serde-serialized JSON strings under a fixed TTL.
//!
//! Every failure on the read path counts as a miss; the caller falls back to
//! Postgres and the response never depends on Redis being up.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

/// Shared cache handle; `ConnectionManager` reconnects on its own.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis cache connected");

        Ok(Self { conn, ttl_seconds })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let raw = match conn.get::<_, Option<String>>(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::error!(key, error = %e, "Redis get failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                // A stale shape from an older deploy; drop it and miss.
                tracing::warn!(key, error = %e, "Discarding undeserializable cache entry");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.conn.clone();
        let raw = serde_json::to_string(value).context("Failed to serialize value for cache")?;
        conn.set_ex::<_, _, ()>(key, raw, self.ttl_seconds)
            .await
            .context("Failed to set cache value")?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .context("Failed to delete cache key")?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

/// Cache key builders, kept together so key formats stay consistent.
pub mod keys {
    use uuid::Uuid;

    use crate::domain::pecas::TipoPeca;

    /// Tenant document template for one piece type.
    pub fn modelo(escritorio_id: Uuid, tipo: TipoPeca) -> String {
        format!("modelo:escritorio:{}:{}", escritorio_id, tipo.as_str())
    }
}
