#![allow(dead_code)]

use oxide_formproc::{Field, FieldType, Processor, Request};

pub fn submit(pairs: &[(&str, &str)]) -> Request {
    pairs
        .iter()
        .fold(Request::post("/form"), |request, (key, value)| {
            request.form_param(*key, *value)
        })
}

pub fn text(name: &str) -> Field {
    Field::new(name).kind(FieldType::Input)
}

pub fn processed<'r>(request: &'r Request, fields: Vec<Field>) -> Processor<'r> {
    let mut processor = Processor::new(request);
    processor
        .add_fields(fields)
        .unwrap_or_else(|e| panic!("Failed to attach fields: {e}"));
    processor.process(false);
    processor
}
