//! Image upload fields and the upload checks behind their rules.

use serde_json::Value;

use super::{Field, FieldType};
use crate::config::ImageSettings;
use crate::upload::{self, UploadedFile};

impl Field {
    /// Builds a file field accepting image uploads.
    ///
    /// Missing limits are taken from `settings`.
    pub fn image(
        name: impl Into<String>,
        required: bool,
        label: Option<&str>,
        max_size: Option<&str>,
        allowed_ext: Option<&[&str]>,
        settings: &ImageSettings,
    ) -> Self {
        let max_size = max_size.map_or_else(|| settings.max_size.clone(), str::to_string);
        let allowed_ext: Vec<Value> = match allowed_ext {
            Some(exts) => exts.iter().map(|ext| Value::from(*ext)).collect(),
            None => settings.allowed_ext.iter().map(|ext| Value::from(ext.as_str())).collect(),
        };

        let field = Self::new(name).kind(FieldType::File).required(required);
        let field = match label {
            Some(label) => field.label(label),
            None => field,
        };

        field
            .rule("valid_image")
            .add_rule("valid_file_type", [Value::Array(allowed_ext)])
            .add_rule("valid_file_size", [Value::String(max_size)])
    }

    /// Passes when nothing was uploaded, otherwise requires an image.
    pub fn valid_image(file: Option<&UploadedFile>) -> bool {
        match file {
            Some(file) if upload::not_empty(file) => upload::is_image(file),
            _ => true,
        }
    }

    /// Passes when nothing was uploaded or no list is given, otherwise
    /// requires an allowed extension.
    pub fn valid_file_type(file: Option<&UploadedFile>, allowed_ext: Option<&[String]>) -> bool {
        match (file, allowed_ext) {
            (Some(file), Some(allowed)) if upload::not_empty(file) => {
                upload::type_allowed(file, allowed)
            }
            _ => true,
        }
    }

    /// Passes when nothing was uploaded or no limit is given, otherwise
    /// requires the size to fit.
    pub fn valid_file_size(file: Option<&UploadedFile>, max_size: Option<&str>) -> bool {
        match (file, max_size) {
            (Some(file), Some(max)) if upload::not_empty(file) => upload::size_allowed(file, max),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Param;
    use serde_json::json;

    #[test]
    fn test_image_field_uses_settings() {
        let field = Field::image("avatar", true, Some("Avatar"), None, None, &ImageSettings::default());
        assert_eq!(field.field_type(), FieldType::File);
        assert_eq!(field.label_text(), Some("Avatar"));

        let rules = field.rules();
        let names: Vec<_> = rules.iter().map(|rule| rule.name.as_str()).collect();
        assert_eq!(
            names,
            ["upload_not_empty", "valid_image", "valid_file_type", "valid_file_size"]
        );
        assert_eq!(
            rules[2].params[1],
            Param::Literal(json!(["jpg", "jpeg", "png", "gif", "webp"]))
        );
        assert_eq!(rules[3].params[1], Param::Literal(json!("1M")));
    }

    #[test]
    fn test_image_field_overrides() {
        let field = Field::image("logo", false, None, Some("200K"), Some(&["svg"]), &ImageSettings::default());
        let rules = field.rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[1].params[1], Param::Literal(json!(["svg"])));
        assert_eq!(rules[2].params[1], Param::Literal(json!("200K")));
    }

    #[test]
    fn test_checks_pass_without_upload() {
        let empty = UploadedFile::empty();
        assert!(Field::valid_image(None));
        assert!(Field::valid_image(Some(&empty)));
        assert!(Field::valid_file_type(Some(&empty), Some(&["png".to_string()])));
        assert!(Field::valid_file_size(None, Some("1K")));
    }

    #[test]
    fn test_checks_defer_to_upload_predicates() {
        let doc = UploadedFile::new("notes.pdf", "application/pdf", 4096);
        assert!(!Field::valid_image(Some(&doc)));
        assert!(!Field::valid_file_type(Some(&doc), Some(&["png".to_string()])));
        assert!(Field::valid_file_type(Some(&doc), None));
        assert!(!Field::valid_file_size(Some(&doc), Some("2K")));
        assert!(Field::valid_file_size(Some(&doc), Some("4K")));
        assert!(Field::valid_file_size(Some(&doc), None));
    }
}
