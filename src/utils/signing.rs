//! HMAC-SHA256 helpers keyed by the server signing secret.
//!
//! Used for three things:
//! - hashing API tokens before they are stored or compared,
//! - hashing locked-link passwords (`key:password`),
//! - signing visitor tickets carried in cookies.

use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

/// Returns the lowercase hex HMAC of `message` (64 characters).
pub fn keyed_hash(secret: &str, message: &str) -> String {
    let mut mac = mac(secret);
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `message` against a hex HMAC produced by [`keyed_hash`] in constant time.
pub fn verify_keyed_hash(secret: &str, message: &str, expected_hex: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };
    let mut mac = mac(secret);
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Stored hash of a locked-link password. The key is mixed in so equal
/// passwords on different links hash differently.
pub fn password_hash(secret: &str, key: &str, password: &str) -> String {
    keyed_hash(secret, &format!("{key}:{password}"))
}

pub fn verify_password(secret: &str, key: &str, password: &str, stored_hash: &str) -> bool {
    verify_keyed_hash(secret, &format!("{key}:{password}"), stored_hash)
}

/// Encodes `payload` as `base64url(payload) "." hex(hmac)`.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload);
    let signature = keyed_hash(secret, &body);
    format!("{body}.{signature}")
}

/// Returns the payload of a token produced by [`sign_payload`], or `None`
/// when the format or signature is wrong.
pub fn open_payload(secret: &str, token: &str) -> Option<Vec<u8>> {
    let (body, signature) = token.split_once('.')?;
    if !verify_keyed_hash(secret, body, signature) {
        return None;
    }
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(body)
        .ok()
}
