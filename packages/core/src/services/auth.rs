//! Admin Authentication
//!
//! A single fixed admin identity guarded by a password check. A successful
//! login issues an opaque bearer token (UUID v4) backed by an in-memory
//! session that expires after a configurable number of hours. Restarting the
//! process invalidates every session.
//!
//! Passwords are compared by SHA-256 digest so the configured secret never
//! has to be kept in plain text.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default session lifetime
pub const DEFAULT_SESSION_HOURS: i64 = 24;

/// Authentication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Session lifetime out of range")]
    SessionLifetime,
}

/// The admin identity returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}

impl AdminUser {
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            id: "admin-1".to_string(),
            email: email.into(),
            role: "admin".to_string(),
            name: "System Administrator".to_string(),
        }
    }
}

/// A live login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: AdminUser,
    pub expires_at: DateTime<Utc>,
}

/// Hex SHA-256 digest of a password
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Issues and checks admin sessions
pub struct AuthService {
    admin: AdminUser,
    password_sha256: String,
    session_ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AuthService {
    /// Service for the admin account with the given email and password digest
    pub fn new(admin_email: impl Into<String>, password_sha256: impl Into<String>) -> Self {
        Self {
            admin: AdminUser::admin(admin_email),
            password_sha256: password_sha256.into().to_ascii_lowercase(),
            session_ttl: Duration::hours(DEFAULT_SESSION_HOURS),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Session lifetime in hours; values chrono cannot represent keep the default
    pub fn with_session_hours(mut self, hours: i64) -> Self {
        match Duration::try_hours(hours) {
            Some(ttl) => self.session_ttl = ttl,
            None => warn!("Session lifetime of {} hours is out of range, keeping default", hours),
        }
        self
    }

    pub fn admin(&self) -> &AdminUser {
        &self.admin
    }

    /// Check credentials and open a session
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if email != self.admin.email || password_digest(password) != self.password_sha256 {
            warn!("Rejected login for '{}'", email);
            return Err(AuthError::InvalidCredentials);
        }

        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .ok_or(AuthError::SessionLifetime)?;
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user: self.admin.clone(),
            expires_at,
        };

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, existing| existing.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());

        info!("🔐 Admin '{}' logged in", email);
        Ok(session)
    }

    /// Resolve a bearer token to its user
    pub fn verify(&self, token: &str) -> Result<AdminUser, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminUser, AuthError> {
        let expired = {
            let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match sessions.get(token) {
                None => return Err(AuthError::InvalidToken),
                Some(session) if session.expires_at > now => return Ok(session.user.clone()),
                Some(_) => true,
            }
        };

        if expired {
            debug!("Dropping expired session");
            self.logout(token);
        }
        Err(AuthError::Expired)
    }

    /// Drop a session; returns whether it existed
    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
            .is_some()
    }

    /// Number of live sessions (expired ones may linger until the next login)
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("admin@care.com", password_digest("admin123"))
    }

    #[test]
    fn test_password_digest_is_hex_sha256() {
        assert_eq!(
            password_digest("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn test_login_and_verify() {
        let auth = service();
        let session = auth.login("admin@care.com", "admin123").unwrap();

        assert_eq!(session.user.id, "admin-1");
        assert_eq!(session.user.role, "admin");
        assert_eq!(auth.verify(&session.token).unwrap().name, "System Administrator");
    }

    #[test]
    fn test_login_rejections() {
        let auth = service();
        assert_eq!(
            auth.login("", "admin123").unwrap_err(),
            AuthError::MissingCredentials
        );
        assert_eq!(
            auth.login("admin@care.com", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth.login("someone@care.com", "admin123").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(auth.session_count(), 0);
    }

    #[test]
    fn test_session_expires() {
        let auth = service();
        let now = Utc::now();
        let session = auth.login_at("admin@care.com", "admin123", now).unwrap();

        assert!(auth.verify_at(&session.token, now + Duration::hours(23)).is_ok());
        assert_eq!(
            auth.verify_at(&session.token, now + Duration::hours(24)).unwrap_err(),
            AuthError::Expired
        );
        assert_eq!(
            auth.verify_at(&session.token, now).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn test_custom_session_hours() {
        let auth = service().with_session_hours(1);
        let now = Utc::now();
        let session = auth.login_at("admin@care.com", "admin123", now).unwrap();

        assert_eq!(session.expires_at, now + Duration::hours(1));
    }

    #[test]
    fn test_oversized_session_lifetime_is_an_error() {
        let auth = service().with_session_hours(3_000_000_000);
        assert_eq!(
            auth.login("admin@care.com", "admin123").unwrap_err(),
            AuthError::SessionLifetime
        );
        assert_eq!(auth.session_count(), 0);

        let auth = service().with_session_hours(i64::MAX);
        let now = Utc::now();
        let session = auth.login_at("admin@care.com", "admin123", now).unwrap();
        assert_eq!(session.expires_at, now + Duration::hours(DEFAULT_SESSION_HOURS));
    }

    #[test]
    fn test_logout_invalidates_token() {
        let auth = service();
        let session = auth.login("admin@care.com", "admin123").unwrap();

        assert!(auth.logout(&session.token));
        assert!(!auth.logout(&session.token));
        assert_eq!(auth.verify(&session.token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(service().verify("nope").unwrap_err(), AuthError::InvalidToken);
    }
}
