//! PostgreSQL repository implementations.
//!
//! Queries are built at runtime with `sqlx::query_as` and bound parameters,
//! so the crate compiles without a live database.
//!
//! # Repositories
//!
//! - [`PgLockedLinkRepository`] - Locked-link storage and retrieval
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_locked_link_repository;
pub mod pg_token_repository;

pub use pg_locked_link_repository::PgLockedLinkRepository;
pub use pg_token_repository::PgTokenRepository;
