//! Handler for thumbnail uploads.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde_json::json;

use crate::api::dto::thumbnail::ThumbnailResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::multipart::{image_from_field, multipart_error};

/// Uploads a thumbnail to the image host.
///
/// # Endpoint
///
/// `POST /api/thumbnails` (`multipart/form-data`, file in the `image` field)
///
/// # Response
///
/// ```json
/// { "url": "https://i.ibb.co/abc/thumb.png" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: no `image` field, empty file, not an image, over 5 MiB
/// - 502 Bad Gateway: the image host failed
/// - 503 Service Unavailable: no image host configured
pub async fn upload_thumbnail_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ThumbnailResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            let image = image_from_field(field).await?;
            let url = state.thumbnail_service.upload(image).await?;
            return Ok(Json(ThumbnailResponse { url }));
        }
    }

    Err(AppError::bad_request(
        "Missing image field",
        json!({ "field": "image" }),
    ))
}
