//! Business logic services for the application layer.

pub mod auth_service;
pub mod gate_service;
pub mod link_service;
pub mod thumbnail_service;

pub use auth_service::AuthService;
pub use gate_service::{ActionStart, Gate, GateService, GateView};
pub use link_service::LinkService;
pub use thumbnail_service::{MAX_THUMBNAIL_BYTES, ThumbnailService};
