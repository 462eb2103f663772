//! HTML page handlers.

mod builder;
mod viewer;

pub use builder::{builder_page_handler, create_handler, preview_handler};
pub use viewer::{
    UnlockForm, reveal_target_handler, start_action_handler, unlock_handler, viewer_handler,
};
