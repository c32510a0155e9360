//! Content Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Server liveness and store connectivity
//! - `GET /api/content` - Current document through the fallback chain
//! - `PUT /api/content` - Replace the document (admin)
//! - `GET /api/content/export` - Download the stored document
//! - `POST /api/content/import` - Store a document as a new version (admin)
//! - `GET /api/content/history` - Newest stored versions
//! - `GET /api/content/health` - Store statistics

use axum::{
    extract::State,
    http::{header, Uri},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use carehub_core::db::VersionSummary;
use carehub_core::services::{ContentHealth, ContentServiceError, ContentSource, FormatMigrator};
use carehub_core::{timestamp_now, ContentDocument};
use serde::Serialize;
use serde_json::Value;

use crate::auth_endpoints::require_admin;
use crate::{AppState, HttpError};

/// Server health response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub uptime: f64,
    pub version: String,
    pub database: String,
}

/// Envelope for successful responses
#[derive(Debug, Serialize)]
struct Success<T: Serialize> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ContentSource>,
}

impl<T: Serialize> Success<T> {
    fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
            source: None,
        })
    }

    fn with_message(data: T, message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message),
            source: None,
        })
    }
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = if state.gateway.has_primary() && state.gateway.health().await.database_available
    {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: timestamp_now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

/// Current content document
///
/// Never fails: the fallback file or the default document stand in for an
/// unavailable database, and `source` says which one answered.
async fn get_content(State(state): State<AppState>) -> Json<Success<ContentDocument>> {
    let loaded = state.gateway.load().await;
    tracing::debug!("Serving content from {:?}", loaded.source);

    Json(Success {
        success: true,
        data: loaded.document,
        message: None,
        source: Some(loaded.source),
    })
}

/// Replace the whole document
///
/// ```bash
/// curl -X PUT http://localhost:3001/api/content \
///   -H "Authorization: Bearer $TOKEN" \
///   -H "Content-Type: application/json" \
///   -d '{"pages": {...}, "metadata": {...}}'
/// ```
async fn save_content(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Success<ContentDocument>>, HttpError> {
    let document = document_from_body(body, "Pages data is required")?;

    let _guard = state.write_lock.lock().await;
    let stored = state.gateway.save(document).await.map_err(|e| {
        tracing::error!("❌ Content save failed: {}", e);
        HttpError::from(e)
    })?;

    Ok(Success::with_message(stored, "Content saved successfully"))
}

/// Download the stored document as a backup file
async fn export_content(State(state): State<AppState>) -> Result<Response, HttpError> {
    let exported = state.gateway.export().await.map_err(|e| match e {
        ContentServiceError::ContentNotFound => {
            HttpError::new("No content found to export", "CONTENT_NOT_FOUND")
        }
        other => HttpError::from(other),
    })?;

    let disposition = format!(
        "attachment; filename=\"content-backup-{}.json\"",
        chrono::Utc::now().timestamp_millis()
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(exported)).into_response())
}

/// Store an uploaded backup as a new version
async fn import_content(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Success<ContentDocument>>, HttpError> {
    let document = document_from_body(body, "Invalid backup file format")?;

    let _guard = state.write_lock.lock().await;
    let stored = state.gateway.import(document).await.map_err(|e| {
        tracing::error!("❌ Content import failed: {}", e);
        HttpError::from(e)
    })?;

    Ok(Success::with_message(stored, "Content imported successfully"))
}

async fn content_history(
    State(state): State<AppState>,
) -> Result<Json<Success<Vec<VersionSummary>>>, HttpError> {
    let history = state.gateway.history().await?;
    Ok(Success::data(history))
}

/// Store statistics; reports an unavailable database instead of failing
async fn content_health(State(state): State<AppState>) -> Json<Success<ContentHealth>> {
    let health = state.gateway.health().await;
    Json(Success {
        success: health.database_available,
        data: health,
        message: None,
        source: None,
    })
}

/// JSON 404 for unknown routes
pub async fn not_found(uri: Uri) -> HttpError {
    tracing::debug!("No route for {}", uri);
    HttpError::new("Route not found", "ROUTE_NOT_FOUND")
}

/// Decode a request body that must carry `pages`
fn document_from_body(body: Value, missing_pages: &str) -> Result<ContentDocument, HttpError> {
    if body.get("pages").map_or(true, Value::is_null) {
        return Err(HttpError::invalid_input(missing_pages));
    }
    FormatMigrator::normalize(body).map_err(|e| HttpError::new(e.to_string(), "VALIDATION_ERROR"))
}

/// Create router with all content endpoints
pub fn routes(state: AppState) -> Router {
    let admin = || middleware::from_fn_with_state(state.clone(), require_admin);

    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/content",
            get(get_content).merge(put(save_content).route_layer(admin())),
        )
        .route("/api/content/export", get(export_content))
        .route(
            "/api/content/import",
            post(import_content).route_layer(admin()),
        )
        .route("/api/content/history", get(content_history))
        .route("/api/content/health", get(content_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_body_without_pages_is_rejected() {
        let err = document_from_body(json!({"metadata": {}}), "Pages data is required").unwrap_err();
        assert_eq!(err.code, "INVALID_INPUT");
        assert_eq!(err.message, "Pages data is required");

        let err = document_from_body(json!({"pages": null}), "nope").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_body_with_bad_pages_is_validation_error() {
        let err = document_from_body(json!({"pages": {"caregiver": 7}}), "x").unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_exported_backup_is_accepted() {
        let body = json!({
            "pages": {"caregiver": {"id": "caregiver", "title": "Caregiver Resources"}},
            "metadata": {"version": "2.0.0", "lastModified": "2024-01-01T00:00:00.000Z"},
            "exportedAt": "2024-01-02T00:00:00.000Z"
        });
        let doc = document_from_body(body, "x").unwrap();
        assert_eq!(doc.pages.len(), 1);
    }
}
