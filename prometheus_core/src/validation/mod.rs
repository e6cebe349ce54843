//! Input sanitization and validation shared by every entry point

pub mod contact;
pub mod rules;
pub mod sanitize;

pub use contact::ContactPayload;
pub use rules::{validate_choice, validate_email, validate_min_chars};
pub use sanitize::{sanitize_image_path, sanitize_phone, sanitize_text};

use serde_json::{Map, Value};
use std::fmt;

/// Field errors collected during one validation pass, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<(String, String)>,
}

impl ValidationReport {
    pub fn add(&mut self, field: &str, message: &str) {
        if !self.has(field) {
            self.errors.push((field.to_string(), message.to_string()));
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|(name, _)| name == field)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, message)| message.as_str())
    }

    /// Human readable summary: every field message, separated by spaces.
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|(_, message)| message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .errors
            .iter()
            .map(|(field, message)| (field.clone(), Value::String(message.clone())))
            .collect();
        Value::Object(map)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationReport> {
        if self.is_valid() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}
