//! API route configuration.
//!
//! All API endpoints require Bearer token authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, upload_thumbnail_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Multipart overhead allowed on top of the thumbnail size limit.
const UPLOAD_BODY_LIMIT: usize = crate::application::services::MAX_THUMBNAIL_BYTES + 64 * 1024;

/// All API routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `POST   /links`        - Create a locked link
/// - `GET    /links/{key}`  - Fetch a locked link
/// - `DELETE /links/{key}`  - Remove a locked link
/// - `POST   /thumbnails`   - Upload a thumbnail image
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route(
            "/links/{key}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route(
            "/thumbnails",
            post(upload_thumbnail_handler).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
