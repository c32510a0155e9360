//! Care Resource Hub HTTP API
//!
//! REST boundary over the core content services. The public viewer reads
//! content; the admin console logs in and replaces or imports the whole
//! document.
//!
//! # Architecture
//!
//! Endpoints are grouped by concern and merged into one router:
//! - `content_endpoints`: content read/write, export/import, history, health
//! - `auth_endpoints`: login/verify/logout and the admin guard
//!
//! # Usage
//!
//! ```bash
//! cargo run -p carehub-server
//! CAREHUB_PORT=8080 RUST_LOG=debug cargo run -p carehub-server
//! ```

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use carehub_core::db::{FallbackFile, LibsqlContentStore};
use carehub_core::services::{AuthService, PersistenceGateway};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth_endpoints;
pub mod config;
mod content_endpoints;
mod http_error;

pub use config::ServerConfig;
pub use http_error::HttpError;

/// Request bodies up to 10 MiB (whole-document saves and imports)
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all endpoints
///
/// `write_lock` serializes document writes so two concurrent saves cannot
/// interleave their upsert and backup steps. Reads never take it.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PersistenceGateway>,
    pub auth: Arc<AuthService>,
    pub write_lock: Arc<Mutex<()>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(gateway: Arc<PersistenceGateway>, auth: Arc<AuthService>) -> Self {
        Self {
            gateway,
            auth,
            write_lock: Arc::new(Mutex::new(())),
            started_at: Instant::now(),
        }
    }

    /// Open the stores and auth service described by `config`
    ///
    /// A database that fails to open is logged and left out: the API still
    /// serves content from the fallback chain, and writes report the store
    /// as unavailable.
    pub async fn from_config(config: &ServerConfig) -> Self {
        let primary = match LibsqlContentStore::open(config.db_path.clone()).await {
            Ok(store) => {
                tracing::info!("📦 Database: {}", config.db_path.display());
                Some(Arc::new(store) as Arc<dyn carehub_core::db::ContentStore>)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Database unavailable at {}: {}",
                    config.db_path.display(),
                    e
                );
                None
            }
        };

        let gateway = PersistenceGateway::new(primary, FallbackFile::new(&config.fallback_path));
        let auth = AuthService::new(&config.admin_email, &config.admin_password_sha256)
            .with_session_hours(config.session_hours);

        Self::new(Arc::new(gateway), Arc::new(auth))
    }
}

/// Create the application router with all endpoint modules
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(content_endpoints::routes(state.clone()))
        .merge(auth_endpoints::routes(state))
        .fallback(content_endpoints::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

/// CORS for the configured origins
///
/// Origins that are not valid header values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
}

/// Start the HTTP server and serve until the process exits
pub async fn start_server(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_router(state, config);
    let addr = config.addr();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Care Resource Hub API listening on http://{}", addr);
    tracing::info!("📡 CORS enabled for {}", config.cors_origins.join(", "));

    axum::serve(listener, app).await?;
    Ok(())
}
