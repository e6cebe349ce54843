//! Admin overrides applied over the bundled site content

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::validation::sanitize::{sanitize_image_path, truncate_chars};

pub const MAX_MODULE_ID_LENGTH: usize = 120;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOverrides {
    #[serde(default)]
    pub hero_image_path: String,
    #[serde(default)]
    pub module_images: BTreeMap<String, String>,
}

impl ContentOverrides {
    /// Builds overrides from arbitrary JSON, keeping only valid image paths.
    ///
    /// Anything that is not an object yields empty overrides.
    pub fn sanitize(input: &Value) -> Self {
        let Some(object) = input.as_object() else {
            return Self::default();
        };

        let hero_image_path = object
            .get("heroImagePath")
            .and_then(Value::as_str)
            .map(sanitize_image_path)
            .unwrap_or_default();

        let mut module_images = BTreeMap::new();
        if let Some(images) = object.get("moduleImages").and_then(Value::as_object) {
            for (module_id, image_path) in images {
                let module_id = truncate_chars(module_id.trim(), MAX_MODULE_ID_LENGTH);
                let image_path = image_path
                    .as_str()
                    .map(sanitize_image_path)
                    .unwrap_or_default();
                if !module_id.is_empty() && !image_path.is_empty() {
                    module_images.insert(module_id, image_path);
                }
            }
        }

        Self {
            hero_image_path,
            module_images,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hero_image_path.is_empty() && self.module_images.is_empty()
    }
}
