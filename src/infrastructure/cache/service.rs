//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LockedLink;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Raised only while connecting; the server falls back to [`super::NullCache`].
    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache encoding error: {0}")]
    Encoding(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache for locked-link records.
///
/// Implementations are fail-open: a broken cache degrades to database
/// lookups and never fails a request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached record for `key`, or `Ok(None)` on a miss or a
    /// backend error.
    async fn get_link(&self, key: &str) -> CacheResult<Option<LockedLink>>;

    /// Caches a record under its key. `ttl_seconds = None` uses the
    /// implementation's default TTL.
    async fn set_link(&self, link: &LockedLink, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Drops the cached record for `key`, if any.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Used by `/health` to report cache status.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
