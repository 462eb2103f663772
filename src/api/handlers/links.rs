//! Handlers for locked-link endpoints (create, read, delete).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use validator::Validate;

use crate::api::middleware::auth::ApiClient;
use crate::api::dto::locked_link::{CreateLinkRequest, CreateLinkResponse, LinkResponse};
use crate::domain::entities::LinkRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a locked link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Preset pack",
///   "actions": [
///     { "platform": "YouTube", "action": "subs", "target": "https://youtube.com/@chan" }
///   ],
///   "target_links": { "tlink1": "https://drive.example.com/pack.zip" },
///   "advanced": { "password": "", "expires_on": "2026-12-31" }
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "key": "q3Jx0_bLk2Ua", "url": "https://locker.example.com/q3Jx0_bLk2Ua" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(client): Extension<ApiClient>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;
    let request = LinkRequest::try_from(payload)?;

    let link = state.link_service.create(request).await?;
    tracing::info!(key = %link.key, client = %client.name, "Locked link created via API");
    let url = state.link_service.public_url(&link.key);

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse { key: link.key, url }),
    ))
}

/// Returns a locked link without its password hash.
///
/// # Endpoint
///
/// `GET /api/links/{key}`
///
/// # Errors
///
/// Returns 404 Not Found if no link has this key.
pub async fn get_link_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(&key).await?;
    let url = state.link_service.public_url(&link.key);

    Ok(Json(LinkResponse::new(link, url, Utc::now().date_naive())))
}

/// Removes a locked link.
///
/// # Endpoint
///
/// `DELETE /api/links/{key}`
///
/// # Behavior
///
/// The record is deleted and its cache entry dropped, so the visitor page
/// answers 404 right away.
///
/// # Errors
///
/// Returns 404 Not Found if no link has this key.
pub async fn delete_link_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Extension(client): Extension<ApiClient>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(&key).await?;
    tracing::info!(%key, client = %client.name, "Locked link removed via API");
    Ok(StatusCode::NO_CONTENT)
}
