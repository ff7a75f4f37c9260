//! Sources of initial field values.
//!
//! A processor looks every field up by name in an [`InitialValues`] source.
//! Maps and JSON objects work as they are; any serializable record, such as
//! a model loaded from a database, can be flattened with [`from_serialize`].

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A flat name to value mapping.
pub trait InitialValues {
    /// Returns the value stored under `key`.
    fn initial_value(&self, key: &str) -> Option<Value>;
}

impl InitialValues for HashMap<String, String> {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.get(key).map(|value| Value::String(value.clone()))
    }
}

impl InitialValues for HashMap<String, Value> {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl InitialValues for IndexMap<String, String> {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.get(key).map(|value| Value::String(value.clone()))
    }
}

impl InitialValues for IndexMap<String, Value> {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl InitialValues for Map<String, Value> {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Only objects carry values.
impl InitialValues for Value {
    fn initial_value(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(key)).cloned()
    }
}

impl<T: InitialValues + ?Sized> InitialValues for &T {
    fn initial_value(&self, key: &str) -> Option<Value> {
        (**self).initial_value(key)
    }
}

/// Flattens a serializable record into a value map.
///
/// Records that do not serialize to an object yield an empty map.
pub fn from_serialize<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    Ok(match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}
