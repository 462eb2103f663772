//! Core domain entities.
//!
//! - [`LockedLink`] - A stored locked link with its actions and targets
//! - [`NewLockedLink`] - Validated input for creating one
//! - [`LinkRequest`] - Unvalidated creator input from the API or the builder
//! - Value types: [`SocialAction`], [`TargetSlot`], [`AdvanceOption`],
//!   [`ButtonStyle`], [`ThemeColor`]

pub mod link_request;
pub mod locked_link;

pub use link_request::{ActionInput, AdvanceInput, LinkRequest};
pub use locked_link::{
    AdvanceOption, ButtonStyle, LockedLink, MAX_TARGET_SLOTS, NewLockedLink,
    PLACEHOLDER_IMAGE_URL, SocialAction, THUMBNAIL_PLACEHOLDER, TargetSlot, ThemeColor,
};
