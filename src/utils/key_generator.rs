//! Locked-link key generation and validation.
//!
//! Keys are opaque: 9 bytes from the OS RNG encoded as URL-safe base64
//! without padding, which gives 12 characters that are safe as a path
//! segment and as part of a cookie path.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const KEY_LENGTH_BYTES: usize = 9;

/// Length of an encoded key.
pub const KEY_LENGTH: usize = 12;

/// Generates a cryptographically secure random key.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_key() -> Result<String, AppError> {
    let mut buffer = [0u8; KEY_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random key",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Checks that a path segment can be a key before hitting storage.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for anything that is not 12 URL-safe
/// base64 characters; a malformed key can never name a record.
pub fn validate_key(key: &str) -> Result<(), AppError> {
    let well_formed = key.len() == KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(AppError::not_found(
            "Locked link not found",
            json!({ "key": key }),
        ))
    }
}
