//! Auth Endpoints
//!
//! # Endpoints
//!
//! - `POST /api/auth/login` - Exchange admin credentials for a bearer token
//! - `POST /api/auth/verify` - Resolve a token to its user
//! - `POST /api/auth/logout` - Drop a session
//!
//! Admin-only routes are wrapped in [`require_admin`], which reads
//! `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use carehub_core::services::{AdminUser, AuthError};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, HttpError};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user: AdminUser,
    pub expires_at: String,
}

/// Log in as the admin
///
/// ```bash
/// curl -X POST http://localhost:3001/api/auth/login \
///   -H "Content-Type: application/json" \
///   -d '{"email": "admin@care.com", "password": "admin123"}'
/// ```
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let session = state
        .auth
        .login(&body.email, &body.password)
        .map_err(|e| match e {
            AuthError::MissingCredentials => HttpError::invalid_input(e.to_string()),
            AuthError::SessionLifetime => {
                tracing::error!("❌ Cannot issue session: {}", e);
                HttpError::new(e.to_string(), "SESSION_ERROR")
            }
            _ => HttpError::unauthorized("Invalid credentials"),
        })?;

    let data = LoginData {
        token: session.token,
        user: session.user,
        expires_at: session.expires_at.to_rfc3339(),
    };
    Ok(Json(json!({ "success": true, "data": data })))
}

/// Check a token and return its user
async fn verify(
    State(state): State<AppState>,
    Json(body): Json<TokenRequest>,
) -> Result<Json<serde_json::Value>, HttpError> {
    if body.token.is_empty() {
        return Err(HttpError::invalid_input("Token is required"));
    }

    let user = state
        .auth
        .verify(&body.token)
        .map_err(|_| HttpError::unauthorized("Invalid token"))?;
    Ok(Json(json!({ "success": true, "data": { "user": user } })))
}

/// Drop the caller's session
///
/// Takes the token from the `Authorization` header or the body. Always
/// succeeds; logging out twice is harmless.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<TokenRequest>>,
) -> Json<serde_json::Value> {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or_else(|| body.map(|Json(body)| body.token))
        .filter(|token| !token.is_empty());

    if let Some(token) = token {
        if state.auth.logout(&token) {
            tracing::info!("🔓 Admin logged out");
        }
    }
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// Reject requests without a valid admin session
///
/// Missing token → 401; unknown or expired token → 403.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return HttpError::unauthorized("Access token required").into_response();
    };

    match state.auth.verify(token) {
        Ok(user) if user.role == "admin" => next.run(request).await,
        Ok(_) => HttpError::forbidden("Admin access required").into_response(),
        Err(e) => {
            tracing::warn!("Rejected admin request: {}", e);
            HttpError::forbidden("Invalid or expired token").into_response()
        }
    }
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Create router with all auth endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", post(verify))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc-123"));
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
