//! Rate limiting middleware
//!
//! Limits are grouped by path prefix. Each group keeps a fixed window per client, and a
//! request is counted against every group whose prefix matches its path, from the
//! broadest to the most specific.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{RateLimitConfig, RateLimitRule};
use crate::AppState;

const PRUNE_THRESHOLD: usize = 10_000;

const API_MESSAGE: &str = "Trop de requetes. Merci de reessayer dans une minute.";
const AI_MESSAGE: &str = "Trop de demandes IA. Merci de reessayer dans quelques minutes.";
const CONTACT_MESSAGE: &str = "Trop de demandes. Merci de reessayer plus tard.";
const ADMIN_MESSAGE: &str = "Trop de requetes admin. Merci de reessayer plus tard.";
const ADMIN_LOGIN_MESSAGE: &str = "Trop de tentatives de connexion. Merci de reessayer plus tard.";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct RateLimitGroup {
    prefix: &'static str,
    rule: RateLimitRule,
    message: &'static str,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimitGroup {
    fn new(prefix: &'static str, rule: RateLimitRule, message: &'static str) -> Self {
        Self {
            prefix,
            rule,
            message,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn hit(&self, client: &str, now: Instant) -> Result<RateLimitUsage, RateLimitError> {
        let window = Duration::from_secs(self.rule.window_seconds);
        let mut windows = self.windows.lock();

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, entry| now.duration_since(entry.started) < window);
        }

        let entry = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.rule.max_requests {
            let reset_in = window.saturating_sub(now.duration_since(entry.started));
            tracing::warn!(prefix = self.prefix, client, "Rate limit exceeded");
            return Err(RateLimitError {
                message: self.message,
                limit: self.rule.max_requests,
                retry_after_seconds: reset_in.as_secs().max(1),
            });
        }

        entry.hits += 1;
        Ok(RateLimitUsage {
            limit: self.rule.max_requests,
            remaining: self.rule.max_requests - entry.hits,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitUsage {
    pub limit: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    groups: Arc<Vec<RateLimitGroup>>,
}

impl RateLimiter {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        Self {
            groups: Arc::new(vec![
                RateLimitGroup::new("/api", config.api, API_MESSAGE),
                RateLimitGroup::new("/api/ai", config.ai, AI_MESSAGE),
                RateLimitGroup::new("/api/contact", config.contact, CONTACT_MESSAGE),
                RateLimitGroup::new("/api/admin", config.admin, ADMIN_MESSAGE),
                RateLimitGroup::new("/api/admin/login", config.admin_login, ADMIN_LOGIN_MESSAGE),
            ]),
        }
    }

    pub fn disabled() -> Self {
        Self {
            groups: Arc::new(Vec::new()),
        }
    }

    pub fn check(&self, path: &str, client: &str) -> Result<Option<RateLimitUsage>, RateLimitError> {
        self.check_at(path, client, Instant::now())
    }

    /// Counts the request in every matching group and reports the most specific usage.
    pub fn check_at(
        &self,
        path: &str,
        client: &str,
        now: Instant,
    ) -> Result<Option<RateLimitUsage>, RateLimitError> {
        let mut usage = None;
        for group in self.groups.iter().filter(|group| group.matches(path)) {
            usage = Some(group.hit(client, now)?);
        }
        Ok(usage)
    }
}

#[derive(Debug)]
pub struct RateLimitError {
    pub message: &'static str,
    pub limit: u32,
    pub retry_after_seconds: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let status = StatusCode::TOO_MANY_REQUESTS;
        let body = Json(json!({
            "success": false,
            "status": status.as_u16(),
            "message": self.message,
        }));

        let mut response = (status, body).into_response();
        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
        headers.insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_seconds));
        response
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let client = state.transport.client_ip(&request);
    let usage = state.rate_limiter.check(request.uri().path(), &client)?;

    let mut response = next.run(request).await;
    if let Some(usage) = usage {
        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(usage.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(usage.remaining));
    }

    Ok(response)
}
