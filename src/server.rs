//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and image host setup, service
//! wiring, and the Axum server lifecycle.

use crate::application::services::{AuthService, GateService, LinkService, ThumbnailService};
use crate::config::Config;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::image_host::{DisabledImageHost, ImageHost, ImgbbHost};
use crate::infrastructure::persistence::{PgLockedLinkRepository, PgTokenRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Connection attempts before startup gives up on PostgreSQL.
const DB_CONNECT_ATTEMPTS: usize = 5;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool (with retries)
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Image host (imgbb, or disabled without an API key)
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = connect_cache(&config).await;
    let image_host = build_image_host(&config)?;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLockedLinkRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool));

    let link_service = Arc::new(LinkService::new(
        link_repository,
        cache.clone(),
        config.token_signing_secret.clone(),
        config.public_base_url.clone(),
    ));
    let gate_service = Arc::new(GateService::new(
        link_service.clone(),
        config.token_signing_secret.clone(),
        chrono::Duration::seconds(config.action_delay_seconds as i64),
    ));
    let thumbnail_service = Arc::new(ThumbnailService::new(image_host));
    let auth_service = Arc::new(AuthService::new(
        token_repository,
        config.token_signing_secret.clone(),
    ));

    let state = AppState {
        link_service,
        gate_service,
        thumbnail_service,
        auth_service,
        cache,
    };

    let app = app_router(state, config.behind_proxy)?;

    let addr = config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects to PostgreSQL, retrying with exponential backoff so the
/// service can start alongside its database.
async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout)
        .idle_timeout(config.database.idle_timeout)
        .max_lifetime(config.database.max_lifetime);

    Retry::start(db_connect_backoff(), || {
        let options = options.clone();
        let url = config.database.url.clone();
        async move {
            options.connect(&url).await.inspect_err(|e| {
                tracing::warn!(error = %e, "Database connection attempt failed");
            })
        }
    })
    .await
    .context("Failed to connect to database")
}

/// Delays between database connection attempts.
fn db_connect_backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(5))
        .map(jitter)
        .take(DB_CONNECT_ATTEMPTS - 1)
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

fn build_image_host(config: &Config) -> Result<Arc<dyn ImageHost>> {
    match &config.imgbb {
        Some(imgbb) => {
            let host = ImgbbHost::new(imgbb.api_key.clone(), imgbb.expiration_seconds)
                .context("Failed to build imgbb client")?;
            tracing::info!("Thumbnail uploads enabled (imgbb)");
            Ok(Arc::new(host))
        }
        None => {
            tracing::info!("Thumbnail uploads disabled");
            Ok(Arc::new(DisabledImageHost))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
