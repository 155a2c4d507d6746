//! Output schema shared by the outbound request and inbound validation.
//!
//! [`response_schema`] is the only definition of the resolved-media shape.
//! The resolver sends it as the service's `responseSchema`, and the
//! normalizer checks every payload against the same value with
//! [`validate_against_schema`] before typed deserialization.

use serde_json::{Map, Value, json};
use thiserror::Error;

use super::{OptionType, Platform};

/// Top-level fields every payload must carry.
pub const REQUIRED_RECORD_FIELDS: [&str; 5] =
    ["title", "platform", "options", "thumbnailUrl", "author"];

/// Fields every download option must carry.
pub const REQUIRED_OPTION_FIELDS: [&str; 4] = ["quality", "size", "format", "type"];

/// A payload does not match the response schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation at '{path}': {reason}")]
pub struct SchemaViolation {
    /// JSON path of the offending node (`$` is the root).
    pub path: String,
    /// What was wrong.
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Builds the structured-output schema for a resolved media record.
#[must_use]
pub fn response_schema() -> Value {
    let platforms: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
    let option_types: Vec<&str> = OptionType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "The actual title of the video found online."
            },
            "platform": { "type": "STRING", "enum": platforms },
            "author": {
                "type": "STRING",
                "description": "The channel name or account handle."
            },
            "duration": {
                "type": "STRING",
                "description": "Video duration (e.g., '10:05')."
            },
            "thumbnailUrl": {
                "type": "STRING",
                "description": "The direct URL to the video thumbnail image."
            },
            "options": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "quality": { "type": "STRING" },
                        "size": { "type": "STRING", "description": "Estimated file size" },
                        "format": { "type": "STRING" },
                        "type": {
                            "type": "STRING",
                            "enum": option_types,
                            "description": "video_audio for normal video, video_only for muted streams, audio_only for music extraction"
                        }
                    },
                    "required": REQUIRED_OPTION_FIELDS
                }
            }
        },
        "required": REQUIRED_RECORD_FIELDS
    })
}

/// Checks `value` against `schema` (declared types, required fields, enums).
///
/// Optional properties may be absent or `null`. Properties the schema does
/// not declare are ignored.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found, depth-first.
pub fn validate_against_schema(schema: &Value, value: &Value) -> Result<(), SchemaViolation> {
    validate_node(schema, value, "$")
}

fn validate_node(schema: &Value, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let declared = schema.get("type").and_then(Value::as_str).unwrap_or("");
    match declared {
        "OBJECT" => {
            let Some(object) = value.as_object() else {
                return Err(SchemaViolation::new(path, "expected an object"));
            };
            validate_object(schema, object, path)
        }
        "ARRAY" => {
            let Some(items) = value.as_array() else {
                return Err(SchemaViolation::new(path, "expected an array"));
            };
            if let Some(item_schema) = schema.get("items") {
                for (index, item) in items.iter().enumerate() {
                    validate_node(item_schema, item, &format!("{path}[{index}]"))?;
                }
            }
            Ok(())
        }
        "STRING" => {
            let Some(text) = value.as_str() else {
                return Err(SchemaViolation::new(path, "expected a string"));
            };
            if let Some(allowed) = schema.get("enum").and_then(Value::as_array)
                && !allowed.iter().any(|candidate| candidate.as_str() == Some(text))
            {
                return Err(SchemaViolation::new(
                    path,
                    format!("'{text}' is not one of the allowed values"),
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_object(
    schema: &Value,
    object: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaViolation> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if object.get(field).is_none_or(Value::is_null) {
                return Err(SchemaViolation::new(
                    path,
                    format!("missing required field '{field}'"),
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property_schema) in properties {
            match object.get(name) {
                None | Some(Value::Null) => {}
                Some(child) => validate_node(property_schema, child, &format!("{path}.{name}"))?,
            }
        }
    }

    Ok(())
}
