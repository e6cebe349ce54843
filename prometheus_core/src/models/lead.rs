//! Lead records captured from the contact form

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::auth::session::format_millis;

/// A validated contact submission waiting for its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub request_type: String,
    pub service: String,
    pub preferred_slot: String,
    pub goal: String,
    pub created_at: DateTime<Utc>,
}

impl LeadDraft {
    pub fn into_lead(self, id: u64) -> Lead {
        Lead {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            request_type: self.request_type,
            service: self.service,
            preferred_slot: self.preferred_slot,
            goal: self.goal,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "whatsapp", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub request_type: String,
    pub service: String,
    pub preferred_slot: String,
    pub goal: String,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
}

/// Stored timestamps keep millisecond precision (`2025-01-02T10:00:00.000Z`).
fn serialize_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_millis(*at))
}
