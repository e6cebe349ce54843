//! Request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ContentOverrides, Lead};
use crate::ai::Intent;
use crate::content::SiteContent;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub success: bool,
    /// Stored records as written, including entries added by hand.
    pub leads: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct AdminContentResponse {
    pub success: bool,
    pub overrides: ContentOverrides,
    pub content: SiteContent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub lead: Lead,
    pub whatsapp_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct AiAnswerResponse {
    pub success: bool,
    pub answer: String,
    pub model: String,
    pub intent: Intent,
}
