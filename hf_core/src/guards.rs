//! Total structural predicates over untrusted JSON values.
//!
//! Dynamically loaded hook plugins and foreign settings files arrive as
//! arbitrary `serde_json::Value`s. These guards answer "does this look like
//! an X" without schema machinery, without allocation, and without ever
//! panicking. They deliberately accept values that are structurally sound
//! but semantically odd (empty command, zero or negative timeout, empty
//! matcher); semantic judgment belongs to the custom rule validator.

use std::str::FromStr;

use serde_json::Value;

use crate::types::{HookEvent, SettingsScope};

/// `{type: "command", command: string, timeout?: integer}` plus anything.
pub fn is_hook_command(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if object.get("type").and_then(Value::as_str) != Some("command") {
        return false;
    }
    if !object.get("command").is_some_and(Value::is_string) {
        return false;
    }
    match object.get("timeout") {
        None => true,
        Some(timeout) => timeout.is_i64() || timeout.is_u64(),
    }
}

/// `{matcher?: string, hooks: HookCommand[]}` plus anything.
pub fn is_hook_configuration(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if let Some(matcher) = object.get("matcher") {
        if !matcher.is_string() {
            return false;
        }
    }
    match object.get("hooks") {
        Some(Value::Array(hooks)) => hooks.iter().all(is_hook_command),
        _ => false,
    }
}

/// An object whose `hooks` key, if present, maps known event names to
/// arrays of hook configurations.
pub fn is_claude_settings(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    match object.get("hooks") {
        None => true,
        Some(hooks) => is_hook_map(hooks),
    }
}

fn is_hook_map(value: &Value) -> bool {
    let Some(hooks) = value.as_object() else {
        return false;
    };
    hooks.iter().all(|(event, configurations)| {
        HookEvent::from_str(event).is_ok()
            && matches!(
                configurations,
                Value::Array(entries) if entries.iter().all(is_hook_configuration)
            )
    })
}

/// Settings metadata: RFC 3339-shaped timestamps, a known scope, and an
/// optional array of well-formed migration records.
pub fn is_hook_metadata(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if !object.get("createdAt").is_some_and(Value::is_string) {
        return false;
    }
    if !object.get("updatedAt").is_some_and(Value::is_string) {
        return false;
    }
    let scope_ok = object
        .get("source")
        .and_then(Value::as_str)
        .is_some_and(|scope| SettingsScope::from_str(scope).is_ok());
    if !scope_ok {
        return false;
    }
    match object.get("migrations") {
        None => true,
        Some(Value::Array(records)) => records.iter().all(is_migration_record),
        Some(_) => false,
    }
}

/// A dynamically loaded hook package manifest: a `name`, optional
/// `version`/`description` strings, and an optional event-keyed hook map in
/// the same shape settings use.
pub fn is_hook_plugin(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if !object.get("name").is_some_and(Value::is_string) {
        return false;
    }
    for optional in ["version", "description"] {
        if let Some(field) = object.get(optional) {
            if !field.is_string() {
                return false;
            }
        }
    }
    match object.get("hooks") {
        None => true,
        Some(hooks) => is_hook_map(hooks),
    }
}

fn is_migration_record(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    if !object.get("version").is_some_and(Value::is_string) {
        return false;
    }
    if !object.get("appliedAt").is_some_and(Value::is_string) {
        return false;
    }
    if !object.get("description").is_some_and(Value::is_string) {
        return false;
    }
    match object.get("changes") {
        None => true,
        Some(Value::Array(changes)) => changes.iter().all(Value::is_string),
        Some(_) => false,
    }
}
