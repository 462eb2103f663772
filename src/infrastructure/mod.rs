//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and image hosting.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`image_host`] - Thumbnail uploads to an external image host
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod image_host;
pub mod persistence;
