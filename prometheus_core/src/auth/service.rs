use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use crate::auth::session::{self, AdminSession};
use crate::config::AdminConfig;
use crate::error::AppError;
use crate::validation::sanitize_text;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
const MAX_CREDENTIAL_CHARS: usize = 500;

/// How an admin request proved its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    ApiKey,
    Session { expires_at: DateTime<Utc> },
}

#[derive(Clone)]
pub struct AuthService {
    admin_key: Option<String>,
    session_secret: String,
    session_ttl_hours: u64,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("enabled", &self.is_enabled())
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

impl AuthService {
    pub fn new(config: &AdminConfig) -> Self {
        let admin_key = config.api_key.trim().to_string();
        let session_secret = match config.session_secret.trim() {
            "" => admin_key.clone(),
            secret => secret.to_string(),
        };

        Self {
            admin_key: (!admin_key.is_empty()).then_some(admin_key),
            session_secret,
            session_ttl_hours: config.session_ttl_hours,
        }
    }

    pub fn disabled() -> Self {
        Self::new(&AdminConfig::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.admin_key.is_some()
    }

    pub fn login(&self, password: Option<&str>) -> Result<AdminSession, AppError> {
        let admin_key = self.require_enabled()?;

        let password = sanitize_text(password.unwrap_or_default(), MAX_CREDENTIAL_CHARS);
        if password.is_empty() || !constant_time_eq(&password, admin_key) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Unauthorized("Identifiants invalides.".to_string()));
        }

        tracing::info!("Admin session issued");
        Ok(session::create_token(&self.session_secret, self.session_ttl_hours))
    }

    /// Accepts either the static key header or a bearer session token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AdminAccess, AppError> {
        let admin_key = self.require_enabled()?;

        if let Some(provided) = header_str(headers, ADMIN_KEY_HEADER) {
            let provided = sanitize_text(provided, MAX_CREDENTIAL_CHARS);
            if !provided.is_empty() && constant_time_eq(&provided, admin_key) {
                return Ok(AdminAccess::ApiKey);
            }
        }

        if let Some(token) = extract_bearer_token(headers) {
            if let Ok(claims) = session::verify_token(&token, &self.session_secret) {
                return Ok(AdminAccess::Session {
                    expires_at: claims.expires_at,
                });
            }
        }

        Err(AppError::Unauthorized("Unauthorized.".to_string()))
    }

    fn require_enabled(&self) -> Result<&str, AppError> {
        self.admin_key
            .as_deref()
            .ok_or_else(|| AppError::NotFound("Not found.".to_string()))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let token = header_str(headers, AUTHORIZATION.as_str())?
        .strip_prefix("Bearer ")?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
