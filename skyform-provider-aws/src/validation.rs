//! Validation of resource attributes against provider schemas
//!
//! Errors carry the attribute path so the engine can point at the
//! offending line of configuration.

use std::collections::HashMap;

use skyform_core::resource::Value;
use skyform_core::schema::ResourceSchema;

use crate::schemas::rum::metrics_destination_schema;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate RUM metrics destination attributes
pub fn validate_metrics_destination(attributes: &HashMap<String, Value>) -> ValidationResult {
    validate_against(&metrics_destination_schema(), attributes)
}

fn validate_against(schema: &ResourceSchema, attributes: &HashMap<String, Value>) -> ValidationResult {
    let mut errors = Vec::new();

    for (name, attr) in &schema.attributes {
        match attributes.get(name) {
            Some(value) => {
                if let Err(e) = attr.attr_type.validate(value) {
                    errors.push(ValidationError {
                        path: name.clone(),
                        message: e.to_string(),
                    });
                }
            }
            None if attr.required => errors.push(ValidationError {
                path: name.clone(),
                message: format!("{} is required", name),
            }),
            None => {}
        }
    }

    if schema.strict {
        for name in attributes.keys() {
            if !schema.attributes.contains_key(name) {
                errors.push(ValidationError {
                    path: name.clone(),
                    message: format!("unknown attribute for {}", schema.resource_type),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        Err(errors)
    }
}
