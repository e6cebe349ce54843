pub mod settings;

pub use settings::{
    AdminConfig, AiConfig, AppConfig, CorsConfig, HttpConfig, RateLimitConfig, RateLimitRule,
    ServerConfig, StorageConfig,
};
