//! Contact form payload validation

use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::rules::{validate_choice, validate_email, validate_min_chars};
use super::sanitize::{sanitize_phone, sanitize_text};
use super::ValidationReport;
use crate::content::Reservation;
use crate::models::LeadDraft;

pub const NAME_MAX_CHARS: usize = 120;
pub const NAME_MIN_CHARS: usize = 2;
pub const EMAIL_MAX_CHARS: usize = 180;
pub const PHONE_MAX_CHARS: usize = 80;
pub const CHOICE_MAX_CHARS: usize = 80;
pub const GOAL_MAX_CHARS: usize = 2000;
pub const GOAL_MIN_CHARS: usize = 10;

pub const DEFAULT_REQUEST_TYPE: &str = "quote";
pub const DEFAULT_SERVICE: &str = "office";
pub const DEFAULT_SLOT: &str = "asap";

/// Raw body of `POST /api/contact`. Every field is optional at this stage, and
/// numbers or booleans are accepted in place of strings.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, alias = "whatsapp", deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub request_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub preferred_slot: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub goal: Option<String>,
}

/// Reads any JSON value as text. `null` is absent; arrays and objects keep their JSON
/// form so they fail the field rules instead of the whole body.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl ContactPayload {
    /// Sanitizes every field and checks it, collecting one error per failing field.
    pub fn validate(&self, reservation: &Reservation) -> Result<LeadDraft, ValidationReport> {
        let mut report = ValidationReport::default();

        let name = sanitize_text(self.name.as_deref().unwrap_or_default(), NAME_MAX_CHARS);
        if validate_min_chars(&name, NAME_MIN_CHARS).is_err() {
            report.add("name", "Le nom doit contenir au moins 2 caracteres.");
        }

        let email = sanitize_text(self.email.as_deref().unwrap_or_default(), EMAIL_MAX_CHARS)
            .to_lowercase();
        if validate_email(&email).is_err() {
            report.add("email", "Adresse email invalide.");
        }

        let phone = self
            .phone
            .as_deref()
            .map(|raw| sanitize_phone(raw, PHONE_MAX_CHARS))
            .filter(|phone| !phone.is_empty());

        let request_type = validate_choice(
            &reservation.request_types,
            self.request_type.as_deref(),
            DEFAULT_REQUEST_TYPE,
            CHOICE_MAX_CHARS,
        )
        .unwrap_or_else(|_| {
            report.add("requestType", "Type de demande invalide.");
            String::new()
        });

        let service = validate_choice(
            &reservation.services,
            self.service.as_deref(),
            DEFAULT_SERVICE,
            CHOICE_MAX_CHARS,
        )
        .unwrap_or_else(|_| {
            report.add("service", "Service invalide.");
            String::new()
        });

        let preferred_slot = validate_choice(
            &reservation.slots,
            self.preferred_slot.as_deref(),
            DEFAULT_SLOT,
            CHOICE_MAX_CHARS,
        )
        .unwrap_or_else(|_| {
            report.add("preferredSlot", "Creneau invalide.");
            String::new()
        });

        let goal = sanitize_text(self.goal.as_deref().unwrap_or_default(), GOAL_MAX_CHARS);
        if validate_min_chars(&goal, GOAL_MIN_CHARS).is_err() {
            report.add("goal", "Decrivez votre besoin en au moins 10 caracteres.");
        }

        report.into_result(LeadDraft {
            name,
            email,
            phone,
            request_type,
            service,
            preferred_slot,
            goal,
            created_at: Utc::now(),
        })
    }
}
