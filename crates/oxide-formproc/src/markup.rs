//! HTML element helpers used by field rendering.

use indexmap::IndexMap;
use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::Label;

/// Attributes that come first, in this order, when rendered.
const ATTRIBUTE_ORDER: &[&str] = &[
    "action",
    "method",
    "type",
    "id",
    "name",
    "value",
    "href",
    "src",
    "width",
    "height",
    "cols",
    "rows",
    "size",
    "maxlength",
    "accept",
    "tabindex",
    "alt",
    "title",
    "class",
    "style",
    "selected",
    "checked",
    "readonly",
    "disabled",
];

/// An ordered set of HTML attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Attribute values keyed by name, in insertion order.
    pub attrs: IndexMap<String, String>,
}

impl Attrs {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing a previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Sets an attribute only if it is not present yet.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Removes an attribute.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Renders the attributes with a leading space, known names first.
    pub fn to_html(&self) -> String {
        let mut keys: Vec<&String> = self.attrs.keys().collect();
        keys.sort_by_key(|key| {
            ATTRIBUTE_ORDER
                .iter()
                .position(|known| *known == key.as_str())
                .unwrap_or(ATTRIBUTE_ORDER.len())
        });

        keys.into_iter()
            .map(|key| format!(r#" {key}="{}""#, html_escape(&self.attrs[key])))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Renders an `<input>`; the type defaults to `text`.
pub fn input(name: &str, value: Option<&str>, attrs: &Attrs) -> String {
    let mut attrs = attrs.clone();
    attrs.set("name", name);
    match value {
        Some(value) => attrs.set("value", value),
        None => {
            attrs.remove("value");
        }
    }
    attrs.set_default("type", "text");

    format!("<input{} />", attrs.to_html())
}

/// Renders a hidden input.
pub fn hidden(name: &str, value: Option<&str>, attrs: &Attrs) -> String {
    input(name, value, &attrs.clone().with("type", "hidden"))
}

/// Renders a password input.
pub fn password(name: &str, value: Option<&str>, attrs: &Attrs) -> String {
    input(name, value, &attrs.clone().with("type", "password"))
}

/// Renders a file input.
pub fn file(name: &str, attrs: &Attrs) -> String {
    input(name, None, &attrs.clone().with("type", "file"))
}

/// Renders a checkbox.
pub fn checkbox(name: &str, value: &str, checked: bool, attrs: &Attrs) -> String {
    toggle("checkbox", name, value, checked, attrs)
}

/// Renders a single radio button.
pub fn radio(name: &str, value: &str, checked: bool, attrs: &Attrs) -> String {
    toggle("radio", name, value, checked, attrs)
}

fn toggle(kind: &str, name: &str, value: &str, checked: bool, attrs: &Attrs) -> String {
    let mut attrs = attrs.clone().with("type", kind);
    if checked {
        attrs.set("checked", "checked");
    } else {
        attrs.remove("checked");
    }
    input(name, Some(value), &attrs)
}

/// Renders a `<textarea>` with escaped content.
pub fn textarea(name: &str, body: Option<&str>, attrs: &Attrs) -> String {
    let mut attrs = attrs.clone();
    attrs.set("name", name);
    attrs.set_default("cols", "50");
    attrs.set_default("rows", "10");

    format!(
        "<textarea{}>{}</textarea>",
        attrs.to_html(),
        body.map(html_escape).unwrap_or_default()
    )
}

/// Renders a `<select>` over `options` (value, text).
pub fn select(
    name: &str,
    options: &IndexMap<String, String>,
    selected: Option<&str>,
    attrs: &Attrs,
) -> String {
    let mut attrs = attrs.clone();
    attrs.set("name", name);

    let options: String = options
        .iter()
        .map(|(value, text)| {
            let selected_attr = if selected == Some(value.as_str()) {
                r#" selected="selected""#
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(value),
                html_escape(text)
            )
        })
        .collect();

    format!("<select{}>{options}</select>", attrs.to_html())
}

/// Renders a `<label>`.
///
/// `text` is inserted verbatim so it may carry markup such as a required
/// marker.
pub fn label(for_id: &str, text: &str, class: &str) -> String {
    let el: Element<Label> = html! { label.for_(#for_id).class(#class) }.raw(text);
    el.render()
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_attribute_order() {
        let attrs = Attrs::new()
            .with("placeholder", "you@example.com")
            .with("class", "wide")
            .with("id", "field_email");
        let html = input("email", Some("a@b.c"), &attrs);
        assert_eq!(
            html,
            r#"<input type="text" id="field_email" name="email" value="a@b.c" class="wide" placeholder="you@example.com" />"#
        );
    }

    #[test]
    fn test_hidden_input() {
        let html = hidden("csrf_token", Some("abc123"), &Attrs::new());
        assert!(html.contains(r#"type="hidden""#));
        assert!(html.contains(r#"name="csrf_token""#));
        assert!(html.contains(r#"value="abc123""#));
    }

    #[test]
    fn test_password_without_value() {
        let html = password("secret", None, &Attrs::new().with("value", "leak"));
        assert!(html.contains(r#"type="password""#));
        assert!(!html.contains("value="));
    }

    #[test]
    fn test_textarea_escapes_body() {
        let html = textarea("bio", Some("<b>hi</b>"), &Attrs::new());
        assert!(html.contains(r#"cols="50" rows="10""#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
    }

    #[test]
    fn test_select_marks_selected_option() {
        let options: IndexMap<String, String> = [("1", "One"), ("2", "Two")]
            .into_iter()
            .map(|(v, t)| (v.to_string(), t.to_string()))
            .collect();
        let html = select("choice", &options, Some("2"), &Attrs::new());
        assert!(html.starts_with(r#"<select name="choice">"#));
        assert!(html.contains(r#"<option value="2" selected="selected">Two</option>"#));
        assert!(html.contains(r#"<option value="1">One</option>"#));
    }

    #[test]
    fn test_checkbox() {
        let checked = checkbox("agree", "1", true, &Attrs::new());
        assert!(checked.contains(r#"type="checkbox""#));
        assert!(checked.contains(r#"checked="checked""#));
        let unchecked = checkbox("agree", "1", false, &Attrs::new());
        assert!(!unchecked.contains("checked="));
    }

    #[test]
    fn test_file_input() {
        let html = file("avatar", &Attrs::new().with("id", "field_avatar"));
        assert_eq!(html, r#"<input type="file" id="field_avatar" name="avatar" />"#);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let html = input("q", Some(r#""><script>"#), &Attrs::new());
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_label_keeps_markup() {
        let html = label("field_name", "Name <em>*</em>", "control-label");
        assert!(html.starts_with("<label"));
        assert!(html.contains(r#"for="field_name""#));
        assert!(html.contains(r#"class="control-label""#));
        assert!(html.contains("Name <em>*</em>"));
        assert!(html.ends_with("</label>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }
}
