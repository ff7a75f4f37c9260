//! # oxide-formproc
//!
//! Form fields bound to a request, validated, with dirty and error state.
//!
//! This crate provides:
//! - [`Field`]: one input's type, label, initial and current value, and rules
//! - [`Processor`]: attaches fields to a request and validates submissions
//! - A small validation engine with the usual rules and message catalogs
//! - Markup helpers rendering fields and labels
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_formproc::{Field, FieldType, Processor, Request};
//!
//! let request = Request::post("/signup").form_param("email", "ada@example.com");
//!
//! let mut processor = Processor::new(&request);
//! processor
//!     .add_fields([
//!         Field::new("email").label("E-mail").as_email(true, 254),
//!         Field::new("age").kind(FieldType::Input).rule("digit"),
//!     ])
//!     .unwrap();
//! processor.on_success(|form| {
//!     assert_eq!(form.value("email", None).unwrap(), Some("ada@example.com"));
//! });
//! processor.process(false);
//!
//! assert_eq!(processor.is_valid(), Some(true));
//! assert_eq!(processor.value("age", None).unwrap(), None);
//! ```
//!
//! ## Initial values
//!
//! Anything implementing [`InitialValues`] seeds the fields on the first,
//! non-submitted request:
//!
//! ```rust
//! use oxide_formproc::{Field, FieldType, Processor, Request};
//! use serde_json::json;
//!
//! let request = Request::get("/profile");
//! let mut processor = Processor::new(&request)
//!     .with_initial_values(json!({ "id": 42, "name": "Ada" }));
//! processor
//!     .add_fields([Field::new("id"), Field::new("name").kind(FieldType::Input)])
//!     .unwrap();
//!
//! assert!(processor.is_initial());
//! assert_eq!(processor.value("name", None).unwrap(), Some("Ada"));
//! assert!(processor.field("id").unwrap().html(None).contains(r#"value="42""#));
//! ```

mod config;
mod error;
pub mod field;
pub mod initial;
pub mod markup;
mod processor;
mod request;
pub mod upload;
pub mod validation;

pub use config::{FieldDefaults, FormConfig, ImageSettings, RequiredPosition};
pub use error::{FormError, Result, ValidationErrors};
pub use field::{Field, FieldDefinition, FieldType, FieldValue, LabelData, RuleDefinition};
pub use initial::InitialValues;
pub use processor::{Processor, MULTIPART};
pub use request::{FormRequest, Method, Request};
pub use upload::{UploadStatus, UploadedFile};
pub use validation::{Messages, MessageCatalog, Param, RuleDescriptor, Validation, Validator};
