//! Repository trait for locked-link data access.

use crate::domain::entities::{LockedLink, NewLockedLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Aggregate counts shown by the admin `stats` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub total: i64,
    pub password_protected: i64,
    pub expired: i64,
}

/// Repository interface for locked links.
///
/// Records are immutable once created; the only other write is deletion.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLockedLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_locked_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockedLinkRepository: Send + Sync {
    /// Stores a new locked link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the key is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLockedLink) -> Result<LockedLink, AppError>;

    /// Finds a locked link by its key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_key(&self, key: &str) -> Result<Option<LockedLink>, AppError>;

    /// Deletes a locked link.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if the key
    /// was unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;

    /// Counts stored links, password-protected links and links expired as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn totals(&self, today: NaiveDate) -> Result<LinkTotals, AppError>;
}
