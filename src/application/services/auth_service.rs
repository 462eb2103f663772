//! Bearer token checks for `/api`.

use std::sync::Arc;

use serde_json::json;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;
use crate::utils::signing::keyed_hash;

/// Resolves raw bearer tokens to stored [`ApiToken`]s.
///
/// Lookups go by `HMAC-SHA256(TOKEN_SIGNING_SECRET, token)`, the same hash
/// the admin CLI writes, so a dump of `api_tokens` cannot be replayed.
pub struct AuthService {
    tokens: Arc<dyn TokenRepository>,
    signing_secret: String,
}

impl AuthService {
    pub fn new(tokens: Arc<dyn TokenRepository>, signing_secret: String) -> Self {
        Self {
            tokens,
            signing_secret,
        }
    }

    pub fn hash_token(&self, raw: &str) -> String {
        keyed_hash(&self.signing_secret, raw)
    }

    /// # Errors
    ///
    /// [`AppError::Unauthorized`] for unknown or revoked tokens.
    pub async fn authenticate(&self, raw: &str) -> Result<ApiToken, AppError> {
        match self.tokens.redeem(&self.hash_token(raw)).await? {
            Some(token) => {
                tracing::debug!(token_id = token.id, client = %token.name, "API client authenticated");
                Ok(token)
            }
            None => Err(AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Invalid or revoked token" }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use chrono::Utc;

    const SECRET: &str = "auth-service-secret";

    fn stored(name: &str, hash: String) -> ApiToken {
        ApiToken {
            id: 7,
            name: name.to_string(),
            token_hash: hash,
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_redeems_keyed_hash() {
        let expected = keyed_hash(SECRET, "raw-token");
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_redeem()
            .withf(move |hash| hash == &expected)
            .times(1)
            .returning(|hash| Ok(Some(stored("ci", hash.to_string()))));

        let service = AuthService::new(Arc::new(tokens), SECRET.to_string());
        let token = service.authenticate("raw-token").await.unwrap();

        assert_eq!(token.name, "ci");
        assert_eq!(token.id, 7);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let mut tokens = MockTokenRepository::new();
        tokens.expect_redeem().returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(tokens), SECRET.to_string());
        let err = service.authenticate("nope").await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_unauthorized() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_redeem()
            .returning(|_| Err(AppError::internal("db down", json!({}))));

        let service = AuthService::new(Arc::new(tokens), SECRET.to_string());
        let err = service.authenticate("raw-token").await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn test_hash_depends_on_secret() {
        let a = AuthService::new(Arc::new(MockTokenRepository::new()), "one".to_string());
        let b = AuthService::new(Arc::new(MockTokenRepository::new()), "two".to_string());

        assert_eq!(a.hash_token("t"), keyed_hash("one", "t"));
        assert_ne!(a.hash_token("t"), b.hash_token("t"));
    }
}
