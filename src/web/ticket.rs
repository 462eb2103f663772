//! Visitor ticket cookie.
//!
//! The ticket is scoped to the link's path, so a browser holds one ticket
//! per link it has opened.

use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use serde_json::json;

use crate::error::AppError;

pub const TICKET_COOKIE: &str = "ll_ticket";

/// Ticket lifetime in the browser.
const TICKET_MAX_AGE_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Returns the ticket cookie value, if the request carries one.
pub fn read_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(TICKET_COOKIE), Some(value)) if !value.is_empty() => Some(value.to_string()),
                _ => None,
            }
        })
}

/// Builds the `Set-Cookie` value for a signed ticket.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the value is not a valid header.
pub fn cookie_header(key: &str, signed_ticket: &str, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{TICKET_COOKIE}={signed_ticket}; Path=/{key}; Max-Age={TICKET_MAX_AGE_SECONDS}; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie).map_err(|e| {
        AppError::internal(
            "Failed to build ticket cookie",
            json!({ "reason": e.to_string() }),
        )
    })
}
