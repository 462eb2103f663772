//! Domain layer: entities, the platform catalogue, and the two pieces of
//! state logic the product is built around.
//!
//! - [`entities`] - Locked-link record and value types
//! - [`platform`] - Supported platforms, their actions and input rules
//! - [`draft`] - Builder form state turned into a create request
//! - [`unlock`] - Visitor ticket and the sequential unlock state machine
//! - [`repositories`] - Data access traits implemented by infrastructure
//!
//! Nothing here depends on HTTP, SQL or Redis.

pub mod draft;
pub mod entities;
pub mod platform;
pub mod repositories;
pub mod unlock;
