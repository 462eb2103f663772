//! Server-rendered pages for creators and visitors.
//!
//! Uses Askama templates from `templates/`.
//!
//! # Modules
//!
//! - [`handlers`] - Builder and visitor page handlers
//! - [`routes`] - Page route configuration
//! - [`ticket`] - Visitor ticket cookie
//! - [`views`] - Templates and view models

mod error;
pub mod handlers;
pub mod routes;
pub mod ticket;
pub mod views;

pub use error::PageError;
