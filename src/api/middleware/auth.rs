//! `Authorization: Bearer` guard for the `/api` routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// The token that authenticated the current request, available to handlers
/// as an `Extension`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub token_id: i64,
    pub name: String,
}

/// Route layer: rejects the request with 401 (`WWW-Authenticate: Bearer`)
/// unless it carries a live token issued by `admin token create`.
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(raw) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Authorization header is missing or invalid" }),
            )
        })?;

    let token = state.auth_service.authenticate(&raw).await?;
    parts.extensions.insert(ApiClient {
        token_id: token.id,
        name: token.name,
    });

    Ok(next.run(Request::from_parts(parts, body)).await)
}
