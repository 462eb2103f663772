//! Cache used when Redis is not configured or unreachable.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::LockedLink;
use async_trait::async_trait;

/// Stores nothing; every lookup goes to the database.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _key: &str) -> CacheResult<Option<LockedLink>> {
        Ok(None)
    }

    async fn set_link(&self, _link: &LockedLink, _ttl_seconds: Option<u64>) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    /// Reported as healthy; `/health` shows the cache as disabled instead.
    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
