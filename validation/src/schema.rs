//! Structural validation against the embedded settings schema.
//!
//! The schema document is authored inline and compiled exactly once per
//! process into [`SETTINGS_SCHEMA`]. The compiled form is immutable shared
//! state, safe for concurrent read-only use; validation itself allocates
//! nothing beyond the returned findings.

use hf_core::HookEvent;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::result::ValidationIssue;

/// The compiled settings schema. Compilation of the embedded document is an
/// invariant; a failure here is a programming error, not an input error.
static SETTINGS_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema_document())
        .expect("embedded settings schema is valid")
});

/// The settings schema as a JSON document.
///
/// Covers both legacy and versioned documents: `$schema`, `version` and
/// `meta` are optional but type-checked when present, and `hooks` keys are
/// restricted to the nine known event names.
fn schema_document() -> Value {
    let events: serde_json::Map<String, Value> = HookEvent::ALL
        .into_iter()
        .map(|event| {
            (
                event.to_string(),
                json!({"$ref": "#/definitions/configurations"}),
            )
        })
        .collect();

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Hook settings",
        "type": "object",
        "properties": {
            "$schema": {"type": "string"},
            "version": {
                "type": "string",
                "pattern": "^\\d+\\.\\d+\\.\\d+(?:-[0-9A-Za-z-]+(?:\\.[0-9A-Za-z-]+)*)?(?:\\+[0-9A-Za-z-]+(?:\\.[0-9A-Za-z-]+)*)?$"
            },
            "hooks": {
                "type": "object",
                "properties": events,
                "additionalProperties": false
            },
            "meta": {"$ref": "#/definitions/meta"}
        },
        "definitions": {
            "configurations": {
                "type": "array",
                "items": {"$ref": "#/definitions/configuration"}
            },
            "configuration": {
                "type": "object",
                "properties": {
                    "matcher": {"type": "string"},
                    "hooks": {
                        "type": "array",
                        "items": {"$ref": "#/definitions/command"}
                    }
                },
                "required": ["hooks"]
            },
            "command": {
                "type": "object",
                "properties": {
                    "type": {"const": "command"},
                    "command": {"type": "string"},
                    "timeout": {"type": "integer"}
                },
                "required": ["type", "command"]
            },
            "meta": {
                "type": "object",
                "properties": {
                    "createdAt": {"type": "string"},
                    "updatedAt": {"type": "string"},
                    "source": {"enum": ["global", "project", "local"]},
                    "migrations": {
                        "type": "array",
                        "items": {"$ref": "#/definitions/migrationRecord"}
                    }
                },
                "required": ["createdAt", "updatedAt", "source"]
            },
            "migrationRecord": {
                "type": "object",
                "properties": {
                    "version": {"type": "string"},
                    "appliedAt": {"type": "string"},
                    "description": {"type": "string"},
                    "changes": {
                        "type": "array",
                        "items": {"type": "string"}
                    }
                },
                "required": ["version", "appliedAt", "description"]
            }
        }
    })
}

/// Validate a value against the settings schema.
///
/// Returns one issue per violation, each with an `instancePath`-style
/// locator and the offending value. Total over any input: null, primitives
/// and arrays simply report a top-level type mismatch. Unknown `hooks` keys
/// are expanded to one issue per key so the event name appears in the path.
pub fn validate_schema(value: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if let Err(errors) = SETTINGS_SCHEMA.validate(value) {
        for error in errors {
            match &error.kind {
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for key in unexpected {
                        issues.push(
                            ValidationIssue::new(
                                format!("{}/{key}", error.instance_path),
                                format!("{key:?} is not a known hook event"),
                            )
                            .with_value(Value::String(key.clone()))
                            .with_expected(known_events()),
                        );
                    }
                }
                kind => {
                    let mut issue =
                        ValidationIssue::new(error.instance_path.to_string(), error.to_string())
                            .with_value(error.instance.clone().into_owned());
                    if let Some(expected) = expected_of(kind) {
                        issue = issue.with_expected(expected);
                    }
                    issues.push(issue);
                }
            }
        }
    }
    issues
}

fn expected_of(kind: &ValidationErrorKind) -> Option<String> {
    match kind {
        ValidationErrorKind::Constant { expected_value } => Some(expected_value.to_string()),
        ValidationErrorKind::Enum { options } => Some(options.to_string()),
        ValidationErrorKind::Required { property } => {
            Some(format!("required property {property}"))
        }
        _ => None,
    }
}

fn known_events() -> String {
    let names: Vec<String> = HookEvent::ALL.into_iter().map(|e| e.to_string()).collect();
    format!("one of {}", names.join(", "))
}
