//! HTML rendering of application errors.

use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::web::views::ErrorTemplate;

/// An [`AppError`] rendered as `error.html` with the same status code.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.0.code(), details = %self.0.details(), "{}", self.0);
        }

        let page = ErrorTemplate {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.0.to_string(),
        };

        (status, page).into_response()
    }
}
