//! Validation findings and their aggregation.

use serde::Serialize;
use serde_json::Value;

/// One validation finding, structural or semantic.
///
/// `path` is a JSON-pointer-style locator (`/hooks/PreToolUse/0/matcher`) so
/// multiple findings across a large document stay distinguishable. `value`
/// carries the offending value where one exists; `expected` describes the
/// acceptable shape or range when that is more useful than prose.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            value: None,
            expected: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// Aggregated outcome of schema plus custom-rule validation.
///
/// `valid` is false exactly when `errors` is non-empty. Warnings and
/// suggestions never affect `valid`; whether a warning blocks anything is a
/// caller-level policy decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
        self.valid = false;
    }

    pub fn warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-selected validation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Escalate dangerous-command findings from warnings to errors. Off by
    /// default: the heuristic is advisory and enforcement belongs to the
    /// caller.
    pub strict: bool,
}
