//! # Settings Validation
//!
//! Two-tier validation for hook settings documents.
//!
//! This crate provides:
//! - A structural tier: an embedded JSON Schema compiled once per process
//!   (`schema`), checking document shape against the versioned settings
//!   layout
//! - A semantic tier: custom rules the schema cannot express (`rules`):
//!   matcher regex sanity, dangerous-command heuristics, timeout bounds
//! - `ValidationResult` aggregation of both tiers
//!
//! Neither tier ever panics or returns `Err` for a malformed document:
//! every finding is data. Security findings are advisory by default;
//! `ValidationOptions { strict: true }` escalates them to errors, and the
//! caller alone decides what blocks.

pub mod result;
pub mod rules;
pub mod schema;

pub use result::{ValidationIssue, ValidationOptions, ValidationResult};
pub use rules::validate_rules;
pub use schema::validate_schema;

use serde_json::Value;
use tracing::debug;

/// Validate a settings document through both tiers.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Runs the compiled-schema structural check, then, for documents that are
/// at least structurally parseable (a JSON object), the custom semantic
/// rules, and aggregates everything into one `ValidationResult`.
///
/// ## Usage
/// ```rust
/// use serde_json::json;
/// use validation::{validate_settings, ValidationOptions};
///
/// let document = json!({"hooks": {"Stop": [{"hooks": []}]}});
/// let result = validate_settings(&document, &ValidationOptions::default());
/// assert!(result.valid);
/// ```
///
/// ## Error Handling
/// Never panics and never returns `Err`; `result.valid` is false exactly
/// when `result.errors` is non-empty.
pub fn validate_settings(value: &Value, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::new();
    for issue in schema::validate_schema(value) {
        result.error(issue);
    }
    if value.is_object() {
        result.merge(rules::validate_rules(value, options));
    }
    debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        valid = result.valid,
        "settings validation finished"
    );
    result
}
