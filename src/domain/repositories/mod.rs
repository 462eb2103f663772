//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are
//! auto-generated via `mockall` for unit tests, and `tests/common` carries
//! in-memory versions for router tests.
//!
//! # Available Repositories
//!
//! - [`LockedLinkRepository`] - Locked-link storage
//! - [`TokenRepository`] - API token authentication

pub mod locked_link_repository;
pub mod token_repository;

pub use locked_link_repository::{LinkTotals, LockedLinkRepository};
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use locked_link_repository::MockLockedLinkRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
