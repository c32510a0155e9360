//! Server configuration from environment variables
//!
//! Read once at startup. Unset variables take their defaults; values that do
//! not parse also fall back to the default, with a warning.

use carehub_core::services::{auth::DEFAULT_SESSION_HOURS, password_digest};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DB_PATH: &str = "./data/carehub.db";
const DEFAULT_FALLBACK_PATH: &str = "./data/content.json";
const DEFAULT_ADMIN_EMAIL: &str = "admin@care.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Accepted session lifetimes: one hour to one year
const SESSION_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=8760;

/// Vite dev server origins
const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
    pub db_path: PathBuf,
    pub fallback_path: PathBuf,
    pub admin_email: String,
    /// Hex SHA-256 digest of the admin password
    pub admin_password_sha256: String,
    pub session_hours: i64,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_PATH),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password_sha256: password_digest(DEFAULT_ADMIN_PASSWORD),
            session_hours: DEFAULT_SESSION_HOURS,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    /// Build from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port: parsed(var("CAREHUB_PORT"), "CAREHUB_PORT", defaults.port),
            bind: parsed(var("CAREHUB_BIND"), "CAREHUB_BIND", defaults.bind),
            db_path: var("CAREHUB_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            fallback_path: var("CAREHUB_FALLBACK_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fallback_path),
            admin_email: var("CAREHUB_ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_password_sha256: match var("CAREHUB_ADMIN_PASSWORD_SHA256") {
                Some(digest) if is_sha256_hex(&digest) => digest.to_ascii_lowercase(),
                Some(_) => {
                    tracing::warn!(
                        "CAREHUB_ADMIN_PASSWORD_SHA256 is not a hex SHA-256 digest, using default"
                    );
                    defaults.admin_password_sha256
                }
                None => defaults.admin_password_sha256,
            },
            session_hours: match parsed(
                var("CAREHUB_SESSION_HOURS"),
                "CAREHUB_SESSION_HOURS",
                defaults.session_hours,
            ) {
                hours if SESSION_HOURS_RANGE.contains(&hours) => hours,
                _ => {
                    tracing::warn!(
                        "CAREHUB_SESSION_HOURS must be between {} and {}, using default",
                        SESSION_HOURS_RANGE.start(),
                        SESSION_HOURS_RANGE.end()
                    );
                    defaults.session_hours
                }
            },
            cors_origins: var("CORS_ALLOW_ORIGIN")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
        }
    }

    /// Socket address for the listener
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn parsed<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}='{}', using default", key, raw);
            default
        }),
    }
}

fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
