//! Layers shared by the API and the web pages: bearer auth (API only),
//! per-IP rate limits and request spans.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
