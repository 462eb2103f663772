//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AuthService, GateService, LinkService, ThumbnailService};
use crate::infrastructure::cache::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub gate_service: Arc<GateService>,
    pub thumbnail_service: Arc<ThumbnailService>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<dyn CacheService>,
}
