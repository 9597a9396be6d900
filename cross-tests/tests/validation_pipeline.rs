//! Validation and guard behavior over realistic and adversarial documents.

use hf_core::guards::{
    is_claude_settings, is_hook_command, is_hook_configuration, is_hook_metadata, is_hook_plugin,
};
use hf_core::{detect_settings_version, SettingsScope, Version};
use migration::{MigrationExecutor, MigrationRegistry};
use serde_json::{json, Value};
use validation::{validate_settings, ValidationOptions};

#[test]
fn dangerous_command_is_advisory_until_the_caller_opts_in() {
    let document = json!({
        "hooks": {
            "SessionEnd": [
                {"hooks": [{"type": "command", "command": "rm -rf /"}]}
            ]
        }
    });
    let before = document.clone();

    let advisory = validate_settings(&document, &ValidationOptions::default());
    assert!(advisory.valid, "advisory finding must not fail validation");
    assert_eq!(advisory.warnings.len(), 1);
    assert!(advisory.warnings[0].message.contains("security"));
    assert_eq!(document, before, "validation must not mutate its input");

    let strict = validate_settings(&document, &ValidationOptions { strict: true });
    assert!(!strict.valid);
    assert!(strict.errors[0].message.contains("security"));
}

#[test]
fn strict_mode_blocks_migration_acceptance_of_flagged_documents() {
    // The same document migrates fine under the default policy but is
    // rejected at the acceptance gate under the caller's strict policy.
    let document = json!({
        "hooks": {
            "Stop": [{"hooks": [{"type": "command", "command": "mkfs.ext4 /dev/sda1"}]}]
        }
    });
    let registry = MigrationRegistry::with_builtin();
    let target = Version::new(1, 0, 0);

    let lenient = MigrationExecutor::new(&registry);
    assert!(
        lenient
            .migrate(&document, &target, SettingsScope::Project)
            .success
    );

    let strict =
        MigrationExecutor::new(&registry).with_options(ValidationOptions { strict: true });
    let result = strict.migrate(&document, &target, SettingsScope::Project);
    assert!(!result.success);
    assert!(result.migrated_settings.is_none());
}

#[test]
fn unknown_event_fails_validation_with_key_in_path() {
    let result = validate_settings(
        &json!({"hooks": {"BadEvent": []}}),
        &ValidationOptions::default(),
    );
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.path == "/hooks/BadEvent"));
}

#[test]
fn guards_survive_adversarial_inputs() {
    let adversarial: Vec<Value> = vec![
        Value::Null,
        json!(0),
        json!(""),
        json!([]),
        json!(true),
        json!({"hooks": {"PreToolUse": [{"hooks": [{"type": "command", "command": 0}]}]}}),
        // Deep nesting must not recurse anywhere unexpected.
        (0..64).fold(json!("leaf"), |inner, _| json!({"hooks": inner})),
    ];
    for value in &adversarial {
        assert!(!is_hook_command(value), "{value}");
        assert!(!is_hook_configuration(value), "{value}");
        assert!(!is_hook_metadata(value), "{value}");
        assert!(!is_hook_plugin(value), "{value}");
        assert!(!is_claude_settings(value), "{value}");
    }
}

#[test]
fn guards_and_validator_agree_on_plugin_shaped_hooks() {
    let plugin = json!({
        "name": "fmt-on-save",
        "version": "1.2.0",
        "hooks": {
            "PostToolUse": [
                {"matcher": "Write", "hooks": [{"type": "command", "command": "cargo fmt"}]}
            ]
        }
    });
    assert!(is_hook_plugin(&plugin));

    // The plugin's hooks, grafted into a settings document, validate clean.
    let settings = json!({"hooks": plugin["hooks"]});
    assert!(is_claude_settings(&settings));
    let result = validate_settings(&settings, &ValidationOptions::default());
    assert!(result.valid, "{:?}", result.errors);
}

#[test]
fn detection_and_validation_compose_over_document_lifecycle() {
    let legacy = json!({"hooks": {}});
    assert_eq!(detect_settings_version(&legacy), Version::zero());

    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let migrated = executor
        .migrate(&legacy, &Version::new(1, 0, 0), SettingsScope::Global)
        .migrated_settings
        .unwrap();
    let migrated = serde_json::to_value(migrated).unwrap();

    assert_eq!(detect_settings_version(&migrated), Version::new(1, 0, 0));
    assert!(is_hook_metadata(&migrated["meta"]));
    assert!(validate_settings(&migrated, &ValidationOptions::default()).valid);
}
