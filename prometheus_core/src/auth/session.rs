//! Stateless admin session tokens.
//!
//! A token is `base64url(json payload) "." base64url(hmac_sha256(payload segment))`.
//! The payload carries the role and the expiry in epoch milliseconds. Nothing is
//! stored server side, so a token stays valid until it expires.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_ROLE: &str = "admin";
pub const DEFAULT_TTL_HOURS: u64 = 12;
const MIN_TTL_HOURS: u64 = 1;

/// Uniform verification failure; the reason is only logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid admin session")]
pub struct InvalidSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn expires_at_iso(&self) -> String {
        format_millis(self.expires_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<serde_json::Value>,
}

pub fn create_token(secret: &str, ttl_hours: u64) -> AdminSession {
    create_token_at(secret, ttl_hours, Utc::now())
}

pub fn create_token_at(secret: &str, ttl_hours: u64, now: DateTime<Utc>) -> AdminSession {
    let ttl_millis = ttl_hours.max(MIN_TTL_HOURS).saturating_mul(3_600_000);
    let exp = now
        .timestamp_millis()
        .saturating_add(i64::try_from(ttl_millis).unwrap_or(i64::MAX));

    let payload = serde_json::json!({ "role": ADMIN_ROLE, "exp": exp });
    let encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
    let signature = URL_SAFE_NO_PAD.encode(sign(&encoded, secret));

    AdminSession {
        token: format!("{}.{}", encoded, signature),
        expires_at: millis_to_datetime(exp).unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

pub fn verify_token(token: &str, secret: &str) -> Result<SessionClaims, InvalidSession> {
    verify_token_at(token, secret, Utc::now())
}

pub fn verify_token_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<SessionClaims, InvalidSession> {
    let result = check(token, secret, now);
    if let Err(reason) = &result {
        tracing::debug!(reason, "admin session rejected");
    }
    result.map_err(|_| InvalidSession)
}

fn check(token: &str, secret: &str, now: DateTime<Utc>) -> Result<SessionClaims, &'static str> {
    if token.is_empty() || secret.is_empty() {
        return Err("missing token or secret");
    }

    let mut parts = token.split('.');
    let (payload, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(payload), Some(signature), None) if !payload.is_empty() && !signature.is_empty() => {
            (payload, signature)
        }
        _ => return Err("malformed token"),
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| "signature encoding")?;
    let mut mac = new_mac(secret);
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).map_err(|_| "signature mismatch")?;

    let decoded = URL_SAFE_NO_PAD.decode(payload).map_err(|_| "payload encoding")?;
    let payload: Payload = serde_json::from_slice(&decoded).map_err(|_| "payload json")?;

    let exp = payload
        .exp
        .as_ref()
        .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
        .ok_or("missing expiry")?;
    if now.timestamp_millis() >= exp {
        return Err("expired");
    }

    if payload.role.as_deref() != Some(ADMIN_ROLE) {
        return Err("wrong role");
    }

    let expires_at = millis_to_datetime(exp).ok_or("expiry out of range")?;
    Ok(SessionClaims { expires_at })
}

fn new_mac(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length.
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC key of any size")
}

fn sign(payload: &str, secret: &str) -> Vec<u8> {
    let mut mac = new_mac(secret);
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

pub(crate) fn format_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &str = "correct horse battery staple";

    fn now_millis() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(Utc::now().timestamp_millis()).unwrap()
    }

    fn signed(payload: &serde_json::Value, secret: &str) -> String {
        let encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(sign(&encoded, secret)))
    }

    #[test]
    fn test_token_is_valid_until_expiry() {
        let now = now_millis();
        let session = create_token_at(SECRET, 12, now);

        let claims = verify_token_at(&session.token, SECRET, now).unwrap();
        assert_eq!(claims.expires_at, session.expires_at);
        assert_eq!(session.expires_at - now, Duration::hours(12));

        let just_before = session.expires_at - Duration::milliseconds(1);
        assert!(verify_token_at(&session.token, SECRET, just_before).is_ok());
        assert_eq!(
            verify_token_at(&session.token, SECRET, session.expires_at),
            Err(InvalidSession)
        );
        assert!(verify_token_at(&session.token, SECRET, session.expires_at + Duration::hours(1)).is_err());
    }

    #[test]
    fn test_fresh_token_verifies_with_wall_clock() {
        let session = create_token(SECRET, DEFAULT_TTL_HOURS);
        assert!(verify_token(&session.token, SECRET).is_ok());
    }

    #[test]
    fn test_ttl_is_clamped_to_one_hour() {
        let now = now_millis();
        let session = create_token_at(SECRET, 0, now);
        assert_eq!(session.expires_at - now, Duration::hours(1));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let session = create_token(SECRET, 1);
        assert!(verify_token(&session.token, "another secret").is_err());
        assert!(verify_token(&session.token, "").is_err());
    }

    #[test]
    fn test_any_flipped_payload_byte_fails() {
        let session = create_token(SECRET, 1);
        let (payload, _) = session.token.split_once('.').unwrap();

        for idx in 0..payload.len() {
            let mut bytes = session.token.clone().into_bytes();
            bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(verify_token(&tampered, SECRET).is_err(), "byte {} accepted", idx);
        }
    }

    #[test]
    fn test_malformed_tokens_fail() {
        let session = create_token(SECRET, 1);
        let (payload, signature) = session.token.split_once('.').unwrap();

        let candidates = vec![
            String::new(),
            "no-dot".to_string(),
            ".".to_string(),
            format!("{}.", payload),
            format!(".{}", signature),
            format!("{}.{}.extra", payload, signature),
            format!("{}.not*base64", payload),
        ];
        for token in &candidates {
            assert!(verify_token(token, SECRET).is_err(), "{:?} accepted", token);
        }
    }

    #[test]
    fn test_signed_but_invalid_payloads_fail() {
        let future = Utc::now().timestamp_millis() + 60_000;

        let missing_exp = signed(&serde_json::json!({ "role": "admin" }), SECRET);
        assert!(verify_token(&missing_exp, SECRET).is_err());

        let wrong_role = signed(&serde_json::json!({ "role": "editor", "exp": future }), SECRET);
        assert!(verify_token(&wrong_role, SECRET).is_err());

        let text_exp = signed(&serde_json::json!({ "role": "admin", "exp": "soon" }), SECRET);
        assert!(verify_token(&text_exp, SECRET).is_err());

        let encoded = URL_SAFE_NO_PAD.encode("not json");
        let not_json = format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(sign(&encoded, SECRET)));
        assert!(verify_token(&not_json, SECRET).is_err());

        let valid = signed(&serde_json::json!({ "role": "admin", "exp": future }), SECRET);
        assert!(verify_token(&valid, SECRET).is_ok());
    }

    #[test]
    fn test_expiry_is_iso_with_millis() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let session = create_token_at(SECRET, 12, now);
        assert_eq!(session.expires_at_iso(), "2025-03-01T20:00:00.000Z");
    }
}
