//! Processes a signup submission and prints the rendered form.
//!
//! Run with `cargo run -p oxide-formproc --example signup`.

use std::sync::Arc;

use oxide_formproc::{
    Field, FieldType, FormConfig, Messages, MessageCatalog, Processor, Request,
};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = FormConfig::from_json(
        r#"{ "fields": { "label_class": "form-label", "placeholder_text": "required" } }"#,
    )?;
    let defaults = Arc::new(config.fields);

    let request = Request::post("/signup").urlencoded_body(
        "csrf=k3y&email=ada%40example&password=engine&confirm=engine&plan=pro",
    );
    let catalog = MessageCatalog::new("signup")
        .message("email", "Please enter a valid e-mail address")
        .message("min_length", ":field needs :param2 characters or more");

    let mut processor = Processor::new(&request)
        .with_action("/signup")
        .with_field_defaults(defaults)
        .with_initial_values(json!({ "csrf": "k3y", "plan": "free" }))
        .with_messages(Messages::Catalog(catalog));

    processor.add_fields([
        Field::new("csrf"),
        Field::new("email").label("E-mail").as_email(true, 254),
        Field::new("password").label("Password").as_password(true, 8, 64),
        Field::new("confirm")
            .label("Repeat password")
            .kind(FieldType::Password)
            .call_rule_shortcut("addRule_Matches", &[json!("password")])?,
        Field::new("plan")
            .label("Plan")
            .kind(FieldType::Radio)
            .select_options([("free", "Free"), ("pro", "Pro")]),
        Field::image("avatar", false, Some("Avatar"), None, None, &config.images),
    ])?;

    processor
        .on_success(|form| info!(values = ?form.values(None), "signup accepted"))
        .on_error(|form| info!(errors = ?form.error_messages(), "signup rejected"));
    processor.process(false);

    info!(dirty = ?processor.dirty_field_names(), "changed fields");
    for field in processor.fields().values() {
        if let Some(label) = field.label_html() {
            println!("{label}");
        }
        println!("{}", field.html(None));
        if let Some(error) = field.error() {
            println!("  -> {error}");
        }
    }

    Ok(())
}
