//! JSON surface of the locker: `/api/links`, `/api/thumbnails` and `/health`.
//!
//! Handlers stay thin. They validate [`dto`] bodies, call the application
//! services and map [`crate::error::AppError`] to `{"error": {...}}` bodies.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
