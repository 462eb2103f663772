//! Application layer services implementing business logic.
//!
//! Services orchestrate domain operations: they call repositories, the
//! cache and the image host, and give HTTP handlers a narrow API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Locked-link creation, lookup and deletion
//! - [`services::gate_service::GateService`] - Visitor gate and unlock progress
//! - [`services::thumbnail_service::ThumbnailService`] - Thumbnail uploads
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
