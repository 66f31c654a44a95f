//! Shoplist API - REST service for shared shopping lists.
//!
//! This binary serves the list API on port 3001.
//!
//! # Architecture
//!
//! - Axum web framework with JSON commands under `/api`
//! - Caller identity supplied by the upstream gateway in request headers
//! - `PostgreSQL` document storage, or process memory for local runs
//! - Sentry for error tracking, `tracing` for structured logs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoplist_api::config::{ApiConfig, StorageBackend};
use shoplist_api::db::{self, InMemoryListRepository, ListRepository, PgListRepository};
use shoplist_api::state::AppState;
use shoplist_core::{Awid, Identity};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoplist_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let repository = open_repository(&config).await;
    let state = AppState::new(config.clone(), repository);

    let app = shoplist_api::app_with_rate_limit(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("shoplist-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

/// Open the configured storage backend.
async fn open_repository(config: &ApiConfig) -> Arc<dyn ListRepository> {
    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .expect("SHOPLIST_DATABASE_URL is required for postgres storage");
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");

            // NOTE: Migrations are NOT run automatically on startup.
            // Run them explicitly via: cargo run -p shoplist-cli -- migrate
            Arc::new(PgListRepository::new(pool))
        }
        StorageBackend::Memory => {
            let repository = InMemoryListRepository::new();
            if config.seed_demo {
                let awid = Awid::parse(db::seed::DEMO_AWID).expect("demo awid is valid");
                let owner = Identity::parse(db::seed::DEMO_OWNER).expect("demo owner is valid");
                db::seed::seed(&repository, &awid, &owner)
                    .await
                    .expect("Failed to seed demo lists");
                tracing::info!(awid = %awid, owner = %owner, "Demo lists seeded");
            }
            tracing::info!("Using in-memory storage; lists are lost on restart");
            Arc::new(repository)
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
