//! Validation and canonicalisation of creator-supplied URLs.
//!
//! Every URL that ends up behind a button (social action, target link,
//! thumbnail) goes through [`normalize_url`] before it is stored.

use url::Url;

/// Longest URL accepted for storage.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URLs with embedded credentials are not allowed")]
    EmbeddedCredentials,

    #[error("URL is longer than {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Normalizes a URL to a canonical form.
///
/// # Rules
///
/// 1. Only `http` and `https` schemes (rejects `javascript:`, `data:`, ...)
/// 2. A host is required; it is lowercased by the parser
/// 3. Default ports are dropped
/// 4. `user:pass@` credentials are rejected
/// 5. Path, query and fragment are preserved
///
/// # Errors
///
/// Returns the matching [`UrlNormalizationError`] variant for each rule.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("HTTPS://EXAMPLE.COM:443/Path#top").unwrap(),
///     "https://example.com/Path#top"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let input = input.trim();
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlNormalizationError::EmbeddedCredentials);
    }

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None)
            .map_err(|_| UrlNormalizationError::InvalidFormat("cannot drop port".to_string()))?;
    }

    Ok(url.to_string())
}
