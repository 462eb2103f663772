#![allow(dead_code)]

//! Shared fixtures for router tests.
//!
//! Handlers run against in-memory repositories and a fake image host, so
//! these tests need no PostgreSQL, Redis or network access. Repository
//! tests in `repository_*.rs` cover the SQL side.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use link_locker::application::services::{
    AuthService, GateService, LinkService, ThumbnailService,
};
use link_locker::domain::entities::{
    ActionInput, AdvanceInput, LinkRequest, LockedLink, NewLockedLink, TargetSlot,
};
use link_locker::domain::platform::Platform;
use link_locker::domain::repositories::{
    ApiToken, LinkTotals, LockedLinkRepository, TokenRepository,
};
use link_locker::error::AppError;
use link_locker::infrastructure::cache::NullCache;
use link_locker::infrastructure::image_host::{ImageHost, ImageHostError, ImageUpload};
use link_locker::state::AppState;
use serde_json::json;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const TEST_BASE_URL: &str = "http://locker.test";
pub const TEST_TOKEN: &str = "test-api-token";
pub const FAKE_IMAGE_URL: &str = "https://i.ibb.co/fake/thumb.png";

#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<LockedLink>>,
}

impl InMemoryLinkRepository {
    /// Stores a link as-is, bypassing request validation.
    pub fn insert(&self, link: LockedLink) {
        self.links.lock().unwrap().push(link);
    }

    pub fn count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<LockedLink> {
        self.links.lock().unwrap().clone()
    }

    pub fn find(&self, key: &str) -> Option<LockedLink> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.key == key)
            .cloned()
    }
}

#[async_trait]
impl LockedLinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLockedLink) -> Result<LockedLink, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.key == new_link.key) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "locked_links_key_key" }),
            ));
        }

        let link = LockedLink {
            id: links.len() as i64 + 1,
            key: new_link.key,
            title: new_link.title,
            subtitle: new_link.subtitle,
            button_name: new_link.button_name,
            actions: new_link.actions,
            targets: new_link.targets,
            advanced: new_link.advanced,
            created_at: Utc::now(),
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<LockedLink>, AppError> {
        Ok(self.find(key))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.key != key);
        Ok(links.len() < before)
    }

    async fn totals(&self, today: NaiveDate) -> Result<LinkTotals, AppError> {
        let links = self.links.lock().unwrap();
        Ok(LinkTotals {
            total: links.len() as i64,
            password_protected: links.iter().filter(|l| l.has_password()).count() as i64,
            expired: links.iter().filter(|l| l.is_expired_on(today)).count() as i64,
        })
    }
}

#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<Vec<ApiToken>>,
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn redeem(&self, token_hash: &str) -> Result<Option<ApiToken>, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && !t.is_revoked())
            .map(|token| {
                token.last_used_at = Some(Utc::now());
                token.clone()
            }))
    }

    async fn insert(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn revoke(&self, id: i64) -> Result<(), AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id && !t.is_revoked()) {
            Some(token) => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found("Token not found", json!({ "id": id }))),
        }
    }
}

/// Image host that records uploads and answers with [`FAKE_IMAGE_URL`].
pub struct FakeImageHost {
    enabled: bool,
    uploads: Mutex<Vec<ImageUpload>>,
}

impl FakeImageHost {
    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, ImageHostError> {
        if !self.enabled {
            return Err(ImageHostError::Disabled);
        }
        self.uploads.lock().unwrap().push(image);
        Ok(FAKE_IMAGE_URL.to_string())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub images: Arc<FakeImageHost>,
}

impl TestContext {
    /// Creates a link through the service, as the API would.
    pub async fn create_link(&self, request: LinkRequest) -> LockedLink {
        self.state.link_service.create(request).await.unwrap()
    }

    /// Stores [`TEST_TOKEN`] so `/api` requests can authenticate.
    pub async fn issue_token(&self) {
        let hash = self.state.auth_service.hash_token(TEST_TOKEN);
        self.tokens.insert("tests", &hash).await.unwrap();
    }
}

/// State with a zero action delay and thumbnail uploads disabled.
pub fn create_test_state() -> TestContext {
    create_test_state_with(0, false)
}

pub fn create_test_state_with(action_delay_seconds: i64, uploads_enabled: bool) -> TestContext {
    let links = Arc::new(InMemoryLinkRepository::default());
    let tokens = Arc::new(InMemoryTokenRepository::default());
    let images = Arc::new(FakeImageHost {
        enabled: uploads_enabled,
        uploads: Mutex::new(Vec::new()),
    });
    let cache = Arc::new(NullCache::new());

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        cache.clone(),
        TEST_SECRET.to_string(),
        TEST_BASE_URL.to_string(),
    ));
    let gate_service = Arc::new(GateService::new(
        link_service.clone(),
        TEST_SECRET.to_string(),
        chrono::Duration::seconds(action_delay_seconds),
    ));
    let thumbnail_service = Arc::new(ThumbnailService::new(images.clone()));
    let auth_service = Arc::new(AuthService::new(tokens.clone(), TEST_SECRET.to_string()));

    let state = AppState {
        link_service,
        gate_service,
        thumbnail_service,
        auth_service,
        cache,
    };

    TestContext {
        state,
        links,
        tokens,
        images,
    }
}

/// A link with two actions (YouTube subscribe, TikTok follow) and two targets.
pub fn sample_request() -> LinkRequest {
    let mut targets = BTreeMap::new();
    targets.insert(TargetSlot::PRIMARY, "https://files.example.com/pack.zip".to_string());
    targets.insert(
        TargetSlot::new(2).unwrap(),
        "https://files.example.com/extra.zip".to_string(),
    );

    LinkRequest {
        title: Some("Preset pack".to_string()),
        subtitle: None,
        button_name: None,
        actions: vec![
            ActionInput {
                platform: Platform::YouTube,
                action: "subs".to_string(),
                value: "https://www.youtube.com/@channel".to_string(),
            },
            ActionInput {
                platform: Platform::TikTok,
                action: "flw".to_string(),
                value: "@dancer".to_string(),
            },
        ],
        targets,
        advanced: AdvanceInput::default(),
    }
}

pub fn protected_request(password: &str) -> LinkRequest {
    let mut request = sample_request();
    request.advanced.password = Some(password.to_string());
    request
}

/// Returns the `ll_ticket=...` pair from a response's `Set-Cookie` header.
pub fn ticket_cookie(response: &axum_test::TestResponse) -> String {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("response sets the ticket cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}
