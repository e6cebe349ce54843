use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub http: HttpConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Honour `x-forwarded-for` / `x-forwarded-proto` from a reverse proxy.
    pub trust_proxy: bool,
    pub require_https: bool,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Empty disables every admin route.
    pub api_key: String,
    /// Falls back to `api_key` when empty.
    pub session_secret: String,
    pub session_ttl_hours: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_overrides_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl RateLimitRule {
    pub const fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub api: RateLimitRule,
    pub ai: RateLimitRule,
    pub contact: RateLimitRule,
    pub admin: RateLimitRule,
    pub admin_login: RateLimitRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub json_body_limit_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            trust_proxy: false,
            require_https: false,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            session_secret: String::new(),
            session_ttl_hours: crate::auth::session::DEFAULT_TTL_HOURS,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api: RateLimitRule::new(120, 60),
            ai: RateLimitRule::new(30, 600),
            contact: RateLimitRule::new(10, 3600),
            admin: RateLimitRule::new(60, 900),
            admin_login: RateLimitRule::new(10, 900),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEV_ORIGINS[0].to_string()],
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            json_body_limit_bytes: 100 * 1024,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("session_secret", &redacted(&self.session_secret))
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("PROMETHEUS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        app_config.apply_legacy_env(|name| std::env::var(name).ok())?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Applies the flat variable names used by existing deployments.
    pub fn apply_legacy_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(port) = get("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        if let Some(value) = get("TRUST_PROXY") {
            self.server.trust_proxy = parse_trust_proxy(&value);
        }
        if let Some(value) = get("REQUIRE_HTTPS") {
            self.server.require_https = parse_flag(&value);
        }

        if let Some(key) = get("ADMIN_API_KEY") {
            self.admin.api_key = key;
        }
        if let Some(secret) = get("ADMIN_SESSION_SECRET") {
            self.admin.session_secret = secret;
        }
        if let Some(ttl) = get("ADMIN_SESSION_TTL_HOURS") {
            self.admin.session_ttl_hours = parse_number("ADMIN_SESSION_TTL_HOURS", &ttl)?;
        }

        if let Some(path) = get("LEADS_PERSIST_PATH") {
            self.storage.leads_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get("CONTENT_OVERRIDES_PATH") {
            self.storage.content_overrides_path = Some(PathBuf::from(path));
        }

        if let Some(key) = get("OPENAI_API_KEY") {
            self.ai.api_key = key;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.ai.model = model;
        }

        let limits = [
            ("API_RATE_LIMIT", &mut self.rate_limit.api),
            ("AI_RATE_LIMIT", &mut self.rate_limit.ai),
            ("CONTACT_RATE_LIMIT", &mut self.rate_limit.contact),
            ("ADMIN_RATE_LIMIT", &mut self.rate_limit.admin),
            ("ADMIN_LOGIN_RATE_LIMIT", &mut self.rate_limit.admin_login),
        ];
        for (name, rule) in limits {
            if let Some(value) = get(name) {
                rule.max_requests = parse_number(name, &value)?;
            }
        }

        if let Some(origins) = get("FRONTEND_ORIGINS").or_else(|| get("FRONTEND_ORIGIN")) {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(limit) = get("JSON_BODY_LIMIT") {
            self.http.json_body_limit_bytes = parse_byte_size(&limit).ok_or_else(|| {
                ConfigError::Message(format!("JSON_BODY_LIMIT has an invalid size: {}", limit))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.http.json_body_limit_bytes == 0 {
            return Err(ConfigError::Message(
                "JSON body limit must be greater than 0".to_string(),
            ));
        }

        let rules = [
            ("api", self.rate_limit.api),
            ("ai", self.rate_limit.ai),
            ("contact", self.rate_limit.contact),
            ("admin", self.rate_limit.admin),
            ("admin_login", self.rate_limit.admin_login),
        ];
        for (name, rule) in rules {
            if rule.max_requests == 0 || rule.window_seconds == 0 {
                return Err(ConfigError::Message(format!(
                    "Rate limit '{}' needs a non-zero limit and window",
                    name
                )));
            }
        }

        if self.ai.request_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "AI request timeout must be greater than 0".to_string(),
            ));
        }

        if self.admin.api_key.trim().is_empty() {
            tracing::info!("ADMIN_API_KEY is not set; admin routes are disabled");
        } else if self.admin.session_secret.trim().is_empty() {
            tracing::warn!("Admin sessions are signed with the admin key; set a separate session secret in production");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Configured origins plus the local dev origins.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = self.cors.allowed_origins.clone();
        for origin in DEV_ORIGINS {
            if !origins.iter().any(|existing| existing == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Message(format!("{} must be a number, got {:?}", name, value)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// `false` and `0` disable proxy trust; hop counts and proxy names enable it.
fn parse_trust_proxy(value: &str) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "false" | "0" | "no" | "off" => false,
        _ => true,
    }
}

/// Parses sizes such as `102400`, `100kb` or `1mb`.
pub fn parse_byte_size(value: &str) -> Option<usize> {
    let value = value.trim().to_ascii_lowercase();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: usize = digits.parse().ok()?;

    let multiplier = match unit.trim() {
        "" | "b" => 1,
        "kb" | "k" => 1024,
        "mb" | "m" => 1024 * 1024,
        _ => return None,
    };
    amount.checked_mul(multiplier)
}
