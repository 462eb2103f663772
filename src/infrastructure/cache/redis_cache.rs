//! Redis-backed cache for locked-link records.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::LockedLink;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Namespace of cached records; a record lives under `locked_link:{key}`.
const KEY_PREFIX: &str = "locked_link:";

fn redis_key(key: &str) -> String {
    format!("{KEY_PREFIX}{key}")
}

/// Caches records as JSON strings.
///
/// Records never change after creation, so an entry stays valid until it
/// expires or the link is deleted. Uses a `ConnectionManager`, which
/// reconnects on its own. Backend errors are logged and reported as misses.
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and checks the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_link`] is
    /// called without a TTL (`CACHE_TTL_SECONDS`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("invalid Redis URL: {e}")))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        conn.ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("PING failed: {e}")))?;

        info!("Connected to Redis");

        Ok(Self {
            conn,
            default_ttl: default_ttl_seconds,
        })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, key: &str) -> CacheResult<Option<LockedLink>> {
        let mut conn = self.conn.clone();

        let payload: Option<String> = match conn.get(redis_key(key)).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Redis GET failed");
                return Ok(None);
            }
        };

        let Some(payload) = payload else {
            debug!(key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str::<LockedLink>(&payload) {
            Ok(link) => {
                debug!(key, "Cache hit");
                Ok(Some(link))
            }
            Err(e) => {
                // Written by an older build with a different record shape.
                warn!(key, error = %e, "Dropping undecodable cache entry");
                let _: Result<i32, _> = conn.del(redis_key(key)).await;
                Ok(None)
            }
        }
    }

    async fn set_link(&self, link: &LockedLink, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let payload =
            serde_json::to_string(link).map_err(|e| CacheError::Encoding(e.to_string()))?;
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let mut conn = self.conn.clone();

        match conn.set_ex::<_, _, ()>(redis_key(&link.key), payload, ttl).await {
            Ok(()) => debug!(key = %link.key, ttl, "Cache set"),
            Err(e) => warn!(key = %link.key, error = %e, "Redis SET failed"),
        }
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();

        match conn.del::<_, i32>(redis_key(key)).await {
            Ok(deleted) if deleted > 0 => debug!(key, "Cache entry removed"),
            Ok(_) => {}
            Err(e) => warn!(key, error = %e, "Redis DEL failed"),
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
