//! Content validation against registered schemas.

use serde::Serialize;
use serde_json::Value;

use crate::schema::registry::SchemaRegistry;

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validate `content` against the schema registered as `schema_key`.
///
/// An unknown key is reported in the result, never raised. Every violation
/// is collected, each prefixed with its location in the document.
pub fn validate(registry: &SchemaRegistry, content: &Value, schema_key: &str) -> ValidationResult {
    let Some(entry) = registry.get(schema_key) else {
        return ValidationResult::failed(vec![format!("Schema not found: {}", schema_key)]);
    };

    match entry.compiled().validate(content) {
        Ok(()) => ValidationResult::ok(),
        Err(errors) => ValidationResult::failed(
            errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    format!("root{}: {}", pointer, err)
                })
                .collect(),
        ),
    }
}
