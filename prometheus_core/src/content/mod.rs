//! Site content served to the frontend
//!
//! The baseline document is bundled with the binary. Admin overrides only ever touch
//! image paths; every other section is carried through as-is.

pub mod whatsapp;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::ContentOverrides;

const BASELINE_JSON: &str = include_str!("site_content.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Label for `value`, or the value itself when it is not in the list.
pub fn find_label<'a>(options: &'a [Choice], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label.as_str())
        .unwrap_or(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub promise: String,
    pub whatsapp_base_url: String,
    #[serde(default)]
    pub whatsapp_number_link: String,
    pub quote_message: String,
    pub booking_message: String,
    pub payment_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub headline: String,
    pub subheadline: String,
    pub cta_primary: String,
    pub cta_secondary: String,
    pub image_path: String,
    pub image_alt: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingModule {
    pub id: String,
    pub title: String,
    pub level: String,
    pub duration: String,
    pub price: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: String,
    pub name: String,
    pub price: String,
    pub period: String,
    pub description: String,
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub features: Vec<String>,
    pub cta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub request_types: Vec<Choice>,
    pub services: Vec<Choice>,
    pub slots: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteContent {
    pub brand: Brand,
    pub hero: Hero,
    pub modules: Vec<TrainingModule>,
    pub pricing: Vec<PricingPlan>,
    pub reservation: Reservation,
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

impl SiteContent {
    pub fn baseline() -> serde_json::Result<Self> {
        serde_json::from_str(BASELINE_JSON)
    }

    /// Copy of this document with non-empty override paths applied.
    pub fn with_overrides(&self, overrides: &ContentOverrides) -> Self {
        let mut content = self.clone();

        if !overrides.hero_image_path.is_empty() {
            content.hero.image_path = overrides.hero_image_path.clone();
        }

        for module in &mut content.modules {
            if let Some(path) = overrides.module_images.get(&module.id) {
                if !path.is_empty() {
                    module.image_path = path.clone();
                }
            }
        }

        content
    }
}
