//! Markup for fields and their labels.

use std::fmt;

use serde::Serialize;

use super::{Field, FieldType};
use crate::config::RequiredPosition;
use crate::markup::{self, html_escape, Attrs};

/// Parts of a field's label, for templates that lay it out themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelData {
    /// Plain label text.
    pub text: String,
    /// Label text with the required marker.
    pub text_full: String,
    /// The rendered `<label>` element.
    pub html: String,
    /// CSS class of the label.
    pub class: String,
    /// Id of the labelled element.
    #[serde(rename = "for")]
    pub for_id: String,
}

impl Field {
    /// Returns the CSS classes of the input, with `extra` appended.
    ///
    /// Hidden fields never carry a class.
    pub fn classes(&self, extra: Option<&str>) -> Option<String> {
        if self.is_hidden() {
            return None;
        }

        let mut classes = Vec::new();
        if let Some(class) = self.class.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            classes.push(class);
        }
        if self.is_error() {
            classes.push(self.defaults.error_class.as_str());
        }
        if let Some(extra) = extra {
            classes.push(extra);
        }

        (!classes.is_empty()).then(|| classes.join(" "))
    }

    /// Returns the placeholder, for types that show one.
    pub fn placeholder_text(&self) -> Option<&str> {
        if !self.kind.accepts_placeholder() {
            return None;
        }
        self.placeholder
            .as_deref()
            .or(self.defaults.placeholder_text.as_deref())
    }

    /// Returns the effective required marker placement.
    pub fn marker_position(&self) -> RequiredPosition {
        self.required_position
            .unwrap_or(self.defaults.required_position)
    }

    /// Returns the effective required marker markup.
    pub fn marker_html(&self) -> &str {
        self.required_html
            .as_deref()
            .unwrap_or(self.defaults.required_html.as_str())
    }

    /// Returns the effective separator between marker and label text.
    pub fn marker_delim(&self) -> &str {
        self.required_delim
            .as_deref()
            .unwrap_or(self.defaults.required_delim.as_str())
    }

    /// Renders the input element.
    pub fn html(&self, extra_class: Option<&str>) -> String {
        let mut attrs = self.attrs.clone();
        if let Some(class) = self.classes(extra_class) {
            attrs.set("class", class);
        }
        if let Some(placeholder) = self.placeholder_text() {
            attrs.set("placeholder", placeholder);
        }
        attrs.set("id", self.element_id());

        let name = self.name.as_str();
        match self.kind {
            FieldType::Hidden => markup::hidden(name, self.value(), &attrs),
            FieldType::Password => markup::password(name, None, &attrs),
            FieldType::Input => markup::input(name, self.value(), &attrs),
            FieldType::Textarea => markup::textarea(name, self.value(), &attrs),
            FieldType::File => markup::file(name, &attrs),
            FieldType::Select => markup::select(name, &self.select_options, self.value(), &attrs),
            FieldType::Checkbox => {
                let checked = self.checked();
                markup::checkbox(name, checked, self.value() == Some(checked), &attrs)
            }
            FieldType::Radio => self.radio_group(&attrs),
        }
    }

    // one radio per option; ids are suffixed with the option index
    fn radio_group(&self, attrs: &Attrs) -> String {
        let id = self.element_id();
        self.select_options
            .iter()
            .enumerate()
            .map(|(index, (value, text))| {
                let attrs = attrs.clone().with("id", format!("{id}_{index}"));
                let button = markup::radio(&self.name, value, self.value() == Some(value.as_str()), &attrs);
                format!("<label>{button} {}</label>", html_escape(text))
            })
            .collect()
    }

    /// Renders the `<label>` element, if the field has label text.
    pub fn label_html(&self) -> Option<String> {
        self.label_data().map(|data| data.html)
    }

    /// Returns the label parts, if the field has label text.
    pub fn label_data(&self) -> Option<LabelData> {
        let text = self.label_text()?;

        let text_full = if self.required {
            let (marker, delim) = (self.marker_html(), self.marker_delim());
            match self.marker_position() {
                RequiredPosition::Before => format!("{marker}{delim}{text}"),
                RequiredPosition::After => format!("{text}{delim}{marker}"),
            }
        } else {
            text.to_string()
        };
        let text_full = text_full.trim().to_string();

        let for_id = self.element_id();
        let class = self.label_css_class().to_string();
        Some(LabelData {
            text: text.to_string(),
            html: markup::label(&for_id, &text_full, &class),
            text_full,
            class,
            for_id,
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldDefaults;
    use std::sync::Arc;

    #[test]
    fn test_hidden_field_has_no_class() {
        let mut field = Field::new("token").css_class("x").initial_value("abc");
        field.set_error("bad");
        assert_eq!(field.classes(Some("extra")), None);
        assert_eq!(
            field.html(None),
            r#"<input type="hidden" id="field_token" name="token" value="abc" />"#
        );
    }

    #[test]
    fn test_classes_include_error_and_extra() {
        let mut field = Field::new("name").kind(FieldType::Input).css_class(" wide ");
        assert_eq!(field.classes(None).as_deref(), Some("wide"));
        field.set_error("required");
        assert_eq!(field.classes(Some("col")).as_deref(), Some("wide error col"));
        assert_eq!(Field::new("n").kind(FieldType::Input).classes(None), None);
    }

    #[test]
    fn test_input_html() {
        let mut field = Field::new("email")
            .kind(FieldType::Input)
            .placeholder("you@example.com")
            .attr("maxlength", "254");
        field.set_value("a@b.c").unwrap();
        assert_eq!(
            field.to_string(),
            r#"<input type="text" id="field_email" name="email" value="a@b.c" maxlength="254" placeholder="you@example.com" />"#
        );
    }

    #[test]
    fn test_password_never_renders_value() {
        let mut field = Field::new("pw").kind(FieldType::Password);
        field.set_value("secret").unwrap();
        let html = field.html(None);
        assert!(html.contains(r#"type="password""#));
        assert!(!html.contains("secret"));
    }

    #[test]
    fn test_placeholder_only_for_text_types() {
        let defaults = Arc::new(FieldDefaults {
            placeholder_text: Some("Type here".to_string()),
            ..FieldDefaults::default()
        });
        let textarea = Field::with_defaults("bio", defaults.clone()).kind(FieldType::Textarea);
        assert_eq!(textarea.placeholder_text(), Some("Type here"));
        let select = Field::with_defaults("pick", defaults).kind(FieldType::Select);
        assert_eq!(select.placeholder_text(), None);
    }

    #[test]
    fn test_select_and_checkbox_html() {
        let mut select = Field::new("size")
            .kind(FieldType::Select)
            .select_options([("s", "Small"), ("l", "Large")]);
        select.set_value("l").unwrap();
        assert!(select
            .html(None)
            .contains(r#"<option value="l" selected="selected">Large</option>"#));

        let mut checkbox = Field::new("agree").as_checkbox(Some("yes"), None);
        checkbox.set_value("yes").unwrap();
        let html = checkbox.html(None);
        assert!(html.contains(r#"value="yes""#));
        assert!(html.contains(r#"checked="checked""#));
    }

    #[test]
    fn test_radio_group() {
        let mut field = Field::new("color")
            .kind(FieldType::Radio)
            .select_options([("r", "Red"), ("g", "Green")]);
        field.set_value("g").unwrap();
        let html = field.html(None);
        assert_eq!(html.matches("<label>").count(), 2);
        assert!(html.contains(r#"id="field_color_1""#));
        assert!(html.contains(r#"value="g" checked="checked""#));
    }

    #[test]
    fn test_label_marker_after() {
        let field = Field::new("name").label("Name").required(true);
        let data = field.label_data().unwrap();
        assert_eq!(data.text, "Name");
        assert_eq!(
            data.text_full,
            r#"Name&nbsp;<span style="color:#cc0000">*</span>"#
        );
        assert_eq!(data.for_id, "field_name");
        assert_eq!(data.class, "control-label");
        assert!(data.html.contains(r#"for="field_name""#));
    }

    #[test]
    fn test_label_marker_before() {
        let field = Field::new("name")
            .label("Name")
            .required(true)
            .required_position(RequiredPosition::Before)
            .required_html("*")
            .required_delim(" ");
        assert_eq!(field.label_data().unwrap().text_full, "* Name");
    }

    #[test]
    fn test_no_label() {
        let field = Field::new("name").required(true);
        assert_eq!(field.label_html(), None);
        assert_eq!(field.label_data(), None);
    }

    #[test]
    fn test_label_data_serializes_for_key() {
        let data = Field::new("q").label("Query").label_data().unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["for"], "field_q");
        assert_eq!(json["text_full"], "Query");
    }
}
