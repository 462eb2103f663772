//! Utility functions shared across layers.
//!
//! - [`key_generator`] - Locked-link key generation and validation
//! - [`url_normalizer`] - URL validation and canonicalisation
//! - [`signing`] - HMAC helpers for tokens, passwords and visitor tickets
//! - [`multipart`] - Reading uploaded files from multipart bodies

pub mod key_generator;
pub mod multipart;
pub mod signing;
pub mod url_normalizer;
