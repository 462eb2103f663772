//! Storage of the bearer tokens that guard `/api`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// A stored API credential. Only the keyed hash of the secret value is
/// kept; the admin CLI prints the raw value once at creation.
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Looks up a live token by hash and stamps `last_used_at` in the same
    /// step. `None` for unknown or revoked hashes.
    async fn redeem(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError>;

    /// # Errors
    ///
    /// [`AppError::Conflict`] when the name or the hash is already stored.
    async fn insert(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError>;

    /// Every token, revoked ones included, newest first.
    async fn list(&self) -> Result<Vec<ApiToken>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError>;

    /// # Errors
    ///
    /// [`AppError::NotFound`] when no live token has this id.
    async fn revoke(&self, id: i64) -> Result<(), AppError>;
}
