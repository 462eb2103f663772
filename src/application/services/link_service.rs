//! Locked-link creation, lookup and deletion.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{LinkRequest, LockedLink};
use crate::domain::repositories::{LinkTotals, LockedLinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::key_generator::{generate_key, validate_key};
use crate::utils::signing::password_hash;

/// Service for creating and retrieving locked links.
///
/// Lookups go through the cache first; creation validates the request,
/// issues a fresh key and hashes the optional password with the server
/// secret.
pub struct LinkService {
    repository: Arc<dyn LockedLinkRepository>,
    cache: Arc<dyn CacheService>,
    signing_secret: String,
    public_base_url: String,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn LockedLinkRepository>,
        cache: Arc<dyn CacheService>,
        signing_secret: String,
        public_base_url: String,
    ) -> Self {
        Self {
            repository,
            cache,
            signing_secret,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a locked link, validating dates against today's UTC date.
    ///
    /// # Errors
    ///
    /// See [`LinkService::create_on`].
    pub async fn create(&self, request: LinkRequest) -> Result<LockedLink, AppError> {
        self.create_on(request, Utc::now().date_naive()).await
    }

    /// Creates a locked link as of `today`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the request is invalid (see
    /// [`LinkRequest::into_new_link`]).
    /// Returns [`AppError::Internal`] if no free key is found or on database errors.
    pub async fn create_on(
        &self,
        request: LinkRequest,
        today: NaiveDate,
    ) -> Result<LockedLink, AppError> {
        let key = self.generate_unique_key().await?;
        let secret = &self.signing_secret;
        let new_link =
            request.into_new_link(key, today, |key, password| password_hash(secret, key, password))?;

        let link = self.repository.create(new_link).await?;

        metrics::counter!("locked_links_created_total").increment(1);
        info!(
            key = %link.key,
            actions = link.actions.len(),
            targets = link.targets.len(),
            protected = link.has_password(),
            "Locked link created"
        );

        Ok(link)
    }

    /// Looks up a locked link by key.
    ///
    /// Malformed keys are reported as not found without touching storage.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get(&self, key: &str) -> Result<LockedLink, AppError> {
        validate_key(key)?;

        if let Ok(Some(link)) = self.cache.get_link(key).await {
            return Ok(link);
        }

        let link = self
            .repository
            .find_by_key(key)
            .await?
            .ok_or_else(|| not_found(key))?;

        if let Err(e) = self.cache.set_link(&link, None).await {
            warn!(key, error = %e, "Failed to cache locked link");
        }

        Ok(link)
    }

    /// Deletes a locked link and drops it from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this key.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        validate_key(key)?;

        if !self.repository.delete(key).await? {
            return Err(not_found(key));
        }

        if let Err(e) = self.cache.invalidate(key).await {
            warn!(key, error = %e, "Failed to invalidate cached locked link");
        }

        info!(key, "Locked link deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn totals(&self, today: NaiveDate) -> Result<LinkTotals, AppError> {
        self.repository.totals(today).await
    }

    /// Public URL visitors open, `{PUBLIC_BASE_URL}/{key}`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Generates a key that is not in use yet. Attempts up to 10 times.
    async fn generate_unique_key(&self) -> Result<String, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for attempt in 1..=MAX_ATTEMPTS {
            let key = generate_key()?;

            if self.repository.find_by_key(&key).await?.is_none() {
                return Ok(key);
            }
            debug!(attempt, "Generated key already taken");
        }

        Err(AppError::internal(
            "Failed to generate unique key",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

fn not_found(key: &str) -> AppError {
    AppError::not_found("Locked link not found", json!({ "key": key }))
}
