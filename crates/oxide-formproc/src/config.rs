//! Process-wide defaults for fields and uploads.
//!
//! These values are loaded once at startup and shared read-only between
//! fields through an [`Arc`](std::sync::Arc).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where the required marker is placed relative to the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequiredPosition {
    /// Marker, delimiter, then the label text.
    Before,
    /// Label text, delimiter, then the marker.
    #[default]
    After,
}

/// Default styling and markup applied to every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDefaults {
    /// CSS class of the `<label>` element.
    pub label_class: String,
    /// CSS class added to an input while its field is in error.
    pub error_class: String,
    /// Markup of the required marker.
    pub required_html: String,
    /// Placement of the required marker.
    pub required_position: RequiredPosition,
    /// Separator between the marker and the label text.
    pub required_delim: String,
    /// Value submitted by a checked checkbox.
    pub checked_value: String,
    /// Placeholder for text-like inputs without their own.
    pub placeholder_text: Option<String>,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            label_class: "control-label".to_string(),
            error_class: "error".to_string(),
            required_html: r#"<span style="color:#cc0000">*</span>"#.to_string(),
            required_position: RequiredPosition::After,
            required_delim: "&nbsp;".to_string(),
            checked_value: "1".to_string(),
            placeholder_text: None,
        }
    }
}

/// Limits used by [`Field::image`](crate::Field::image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Maximum upload size, e.g. `"1M"` or `"512K"`.
    pub max_size: String,
    /// Allowed file extensions, lowercase, without the dot.
    pub allowed_ext: Vec<String>,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            max_size: "1M".to_string(),
            allowed_ext: ["jpg", "jpeg", "png", "gif", "webp"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

/// Complete form configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Field styling defaults.
    pub fields: FieldDefaults,
    /// Image upload limits.
    pub images: ImageSettings,
}

impl FormConfig {
    /// Parses a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
