//! Web page route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    builder_page_handler, create_handler, preview_handler, reveal_target_handler,
    start_action_handler, unlock_handler, viewer_handler,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Builder form with a thumbnail file plus the text fields.
const FORM_BODY_LIMIT: usize = crate::application::services::MAX_THUMBNAIL_BYTES + 256 * 1024;

/// Builder routes.
///
/// # Endpoints
///
/// - `GET  /`        - Builder form
/// - `POST /`        - Create a locked link from the form
/// - `POST /preview` - Preview the form without saving
pub fn builder_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(builder_page_handler).post(create_handler))
        .route("/preview", post(preview_handler))
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
}

/// Visitor routes.
///
/// # Endpoints
///
/// - `GET  /{key}`                 - Locked link page
/// - `POST /{key}/unlock`          - Password check
/// - `POST /{key}/actions/{index}` - Start a social action
/// - `POST /{key}/targets/{slot}`  - Reveal a target link
pub fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/{key}", get(viewer_handler))
        .route("/{key}/unlock", post(unlock_handler))
        .route("/{key}/actions/{index}", post(start_action_handler))
        .route("/{key}/targets/{slot}", post(reveal_target_handler))
}
