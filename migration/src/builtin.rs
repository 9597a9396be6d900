//! The built-in migration chain.
//!
//! One migration exists today: `1.0.0`, which wraps a legacy document in
//! the versioned envelope. The transform itself only touches the envelope
//! fields (`$schema`, `version`); all `meta` bookkeeping (creation,
//! timestamps, scope, audit records) is owned by the executor so that
//! every migration gets it uniformly.

use anyhow::bail;
use hf_core::{Version, SETTINGS_SCHEMA_URI};
use serde_json::{json, Value};

use crate::registry::Migration;

/// The built-in chain, ascending.
pub fn builtin_migrations() -> Vec<Migration> {
    vec![wrap_legacy()]
}

/// `0.0.0 -> 1.0.0`: stamp the versioned envelope onto a legacy document.
/// Hook content is deliberately left untouched.
fn wrap_legacy() -> Migration {
    Migration::new(
        Version::new(1, 0, 0),
        "Wrap legacy settings in the versioned envelope",
        |mut value| {
            let Some(object) = value.as_object_mut() else {
                bail!("settings document is not a JSON object");
            };
            object.insert("$schema".to_string(), json!(SETTINGS_SCHEMA_URI));
            object.insert("version".to_string(), json!("1.0.0"));
            Ok(value)
        },
    )
    .with_changes([
        "added $schema identifier",
        "added semantic version field",
        "introduced meta audit metadata",
    ])
    .with_down(|mut value| {
        let Some(object) = value.as_object_mut() else {
            bail!("settings document is not a JSON object");
        };
        object.remove("$schema");
        object.remove("version");
        object.remove("meta");
        Ok(value)
    })
    .with_validate(|value| {
        let envelope_ok = value.get("$schema").is_some_and(Value::is_string)
            && value.get("version").and_then(Value::as_str) == Some("1.0.0");
        let hooks_ok = match value.get("hooks") {
            None => true,
            Some(hooks) => hooks.is_object(),
        };
        envelope_ok && hooks_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_stamps_envelope_and_preserves_hooks() {
        let legacy = json!({
            "hooks": {
                "PostToolUse": [{"hooks": [{"type": "command", "command": "x"}]}]
            }
        });
        let migration = wrap_legacy();
        let migrated = migration.apply_up(legacy.clone()).unwrap();
        assert_eq!(migrated["$schema"], json!(SETTINGS_SCHEMA_URI));
        assert_eq!(migrated["version"], json!("1.0.0"));
        assert_eq!(migrated["hooks"], legacy["hooks"]);
        assert!(migration.self_check(&migrated));
    }

    #[test]
    fn test_up_rejects_non_object() {
        let migration = wrap_legacy();
        assert!(migration.apply_up(json!([])).is_err());
        assert!(migration.apply_up(Value::Null).is_err());
    }

    #[test]
    fn test_down_strips_envelope() {
        let versioned = json!({
            "$schema": SETTINGS_SCHEMA_URI,
            "version": "1.0.0",
            "hooks": {"Stop": []},
            "meta": {
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T00:00:00Z",
                "source": "project"
            }
        });
        let migration = wrap_legacy();
        let legacy = migration.apply_down(versioned).unwrap().unwrap();
        assert_eq!(legacy, json!({"hooks": {"Stop": []}}));
    }

    #[test]
    fn test_validate_rejects_missing_envelope() {
        let migration = wrap_legacy();
        assert!(!migration.self_check(&json!({"version": "1.0.0"})));
        assert!(!migration.self_check(&json!({
            "$schema": SETTINGS_SCHEMA_URI,
            "version": "0.9.0"
        })));
        assert!(!migration.self_check(&json!({
            "$schema": SETTINGS_SCHEMA_URI,
            "version": "1.0.0",
            "hooks": []
        })));
    }
}
