//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: Database or an enabled cache is failing
///
/// # Components Checked
///
/// 1. **Database**: Counts stored locked links
/// 2. **Cache**: Redis PING (`disabled` without Redis)
/// 3. **Image host**: Reports whether thumbnail uploads are configured
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected, 42 locked links" },
///     "cache": { "status": "ok", "message": "redis connected" },
///     "image_host": { "status": "disabled", "message": "IMGBB_API_KEY not set" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;
    let image_host = check_image_host(&state);

    let all_healthy = database.is_healthy() && cache.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            image_host,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_service.totals(Utc::now().date_naive()).await {
        Ok(totals) => CheckStatus::ok(format!("Connected, {} locked links", totals.total)),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();
    if backend == "disabled" {
        return CheckStatus::disabled("Redis not configured");
    }

    if state.cache.health_check().await {
        CheckStatus::ok(format!("{} connected", backend))
    } else {
        CheckStatus::error(format!("{} connection failed", backend))
    }
}

fn check_image_host(state: &AppState) -> CheckStatus {
    if state.thumbnail_service.is_enabled() {
        CheckStatus::ok("Thumbnail uploads enabled")
    } else {
        CheckStatus::disabled("IMGBB_API_KEY not set")
    }
}
