//! End-to-end migration pipelines across the engine crates.

use hf_core::{detect_settings_version, SettingsScope, Version};
use migration::{Migration, MigrationExecutor, MigrationRegistry};
use serde_json::{json, Value};

fn legacy_document() -> Value {
    json!({
        "hooks": {
            "PostToolUse": [
                {
                    "matcher": "Write|Edit",
                    "hooks": [
                        {"type": "command", "command": "cargo fmt", "timeout": 30000},
                        {"type": "command", "command": "cargo clippy"}
                    ]
                }
            ]
        }
    })
}

#[test]
fn legacy_document_migrates_to_one_zero_zero() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let document = legacy_document();

    let result = executor.migrate(&document, &Version::new(1, 0, 0), SettingsScope::Project);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.applied_migrations, vec!["1.0.0".to_string()]);

    let migrated = result.migrated_settings.unwrap();
    assert_eq!(migrated.version.as_deref(), Some("1.0.0"));
    assert_eq!(migrated.schema.as_deref(), Some(hf_core::SETTINGS_SCHEMA_URI));

    let meta = migrated.meta.as_ref().unwrap();
    assert_eq!(meta.migrations.len(), 1);
    assert_eq!(meta.migrations[0].version, "1.0.0");
    assert_eq!(meta.source, SettingsScope::Project);

    // The original hook content survives the envelope byte-for-byte.
    let round_trip = serde_json::to_value(&migrated).unwrap();
    assert_eq!(round_trip["hooks"], document["hooks"]);
}

#[test]
fn migrating_a_current_document_is_idempotent() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let target = Version::new(1, 0, 0);

    let first = executor.migrate(&legacy_document(), &target, SettingsScope::Global);
    let migrated = serde_json::to_value(first.migrated_settings.unwrap()).unwrap();

    let second = executor.migrate(&migrated, &target, SettingsScope::Global);
    assert!(second.success);
    assert!(
        second.applied_migrations.is_empty(),
        "fast path must not re-apply migrations"
    );

    let unchanged = serde_json::to_value(second.migrated_settings.unwrap()).unwrap();
    assert_eq!(unchanged["hooks"], migrated["hooks"]);
    assert_eq!(unchanged["meta"], migrated["meta"], "fast path must not mutate");
}

#[test]
fn rollback_then_forward_round_trips() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let target = Version::new(1, 0, 0);

    let forward = executor.migrate(&legacy_document(), &target, SettingsScope::Local);
    let migrated = serde_json::to_value(forward.migrated_settings.unwrap()).unwrap();

    let back = executor.rollback(&migrated, &Version::zero());
    assert!(back.success, "{:?}", back.errors);
    assert_eq!(back.applied_migrations, vec!["1.0.0".to_string()]);

    let legacy_again = serde_json::to_value(back.migrated_settings.unwrap()).unwrap();
    assert_eq!(legacy_again, legacy_document(), "down must fully strip the envelope");
    assert_eq!(detect_settings_version(&legacy_again), Version::zero());

    // Forward again: equivalent document modulo timestamps and audit noise.
    let again = executor.migrate(&legacy_again, &target, SettingsScope::Local);
    assert!(again.success);
    let remigrated = serde_json::to_value(again.migrated_settings.unwrap()).unwrap();
    assert_eq!(remigrated["hooks"], migrated["hooks"]);
    assert_eq!(remigrated["version"], migrated["version"]);
    assert_eq!(remigrated["$schema"], migrated["$schema"]);
    assert_eq!(
        remigrated["meta"]["migrations"].as_array().unwrap().len(),
        migrated["meta"]["migrations"].as_array().unwrap().len()
    );
}

#[test]
fn multi_step_chain_records_every_step_in_order() {
    let mut registry = MigrationRegistry::with_builtin();
    registry
        .register(
            Migration::new(
                Version::new(1, 1, 0),
                "Normalize timeouts",
                |mut value| {
                    value["version"] = json!("1.1.0");
                    Ok(value)
                },
            )
            .with_changes(["re-stamped version"])
            .with_down(|mut value| {
                value["version"] = json!("1.0.0");
                Ok(value)
            }),
        )
        .unwrap();

    let executor = MigrationExecutor::new(&registry);
    let result = executor.migrate(
        &legacy_document(),
        &Version::new(1, 1, 0),
        SettingsScope::Project,
    );
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(
        result.applied_migrations,
        vec!["1.0.0".to_string(), "1.1.0".to_string()]
    );

    let migrated = result.migrated_settings.unwrap();
    let records = &migrated.meta.as_ref().unwrap().migrations;
    let versions: Vec<&str> = records.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0", "1.1.0"]);
    assert!(!records[1].changes.is_empty());
}

#[test]
fn partial_rollback_keeps_earlier_audit_records() {
    let mut registry = MigrationRegistry::with_builtin();
    registry
        .register(
            Migration::new(Version::new(1, 1, 0), "second step", |mut value| {
                value["version"] = json!("1.1.0");
                Ok(value)
            })
            .with_down(|mut value| {
                value["version"] = json!("1.0.0");
                Ok(value)
            }),
        )
        .unwrap();
    let executor = MigrationExecutor::new(&registry);

    let forward = executor.migrate(
        &legacy_document(),
        &Version::new(1, 1, 0),
        SettingsScope::Project,
    );
    let migrated = serde_json::to_value(forward.migrated_settings.unwrap()).unwrap();

    let back = executor.rollback(&migrated, &Version::new(1, 0, 0));
    assert!(back.success, "{:?}", back.errors);

    let rolled = back.migrated_settings.unwrap();
    assert_eq!(rolled.version.as_deref(), Some("1.0.0"));
    let records = &rolled.meta.as_ref().unwrap().migrations;
    assert_eq!(records.len(), 1, "only the rolled-back record is removed");
    assert_eq!(records[0].version, "1.0.0");
}

#[test]
fn rollback_without_down_has_no_partial_effect() {
    let mut registry = MigrationRegistry::with_builtin();
    registry
        .register(Migration::new(
            Version::new(1, 1, 0),
            "irreversible step",
            |mut value| {
                value["version"] = json!("1.1.0");
                Ok(value)
            },
        ))
        .unwrap();
    let executor = MigrationExecutor::new(&registry);

    let forward = executor.migrate(
        &legacy_document(),
        &Version::new(1, 1, 0),
        SettingsScope::Project,
    );
    let migrated = serde_json::to_value(forward.migrated_settings.unwrap()).unwrap();

    let back = executor.rollback(&migrated, &Version::zero());
    assert!(!back.success);
    assert!(back.migrated_settings.is_none());
    assert!(back.errors[0].contains("no down transform"), "{:?}", back.errors);
}

#[test]
fn rollback_target_must_be_below_current() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let document = json!({"version": "1.0.0", "hooks": {}});

    let same = executor.rollback(&document, &Version::new(1, 0, 0));
    assert!(!same.success);
    assert!(same.errors[0].contains("not below"));

    let above = executor.rollback(&document, &Version::new(2, 0, 0));
    assert!(!above.success);
}

#[test]
fn migrating_to_an_unregistered_version_is_terminal() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);
    let result = executor.migrate(
        &legacy_document(),
        &Version::new(9, 9, 9),
        SettingsScope::Project,
    );
    assert!(!result.success);
    assert!(result.errors[0].contains("No migration path"));
}

#[test]
fn dry_run_previews_chain_without_touching_documents() {
    let registry = MigrationRegistry::with_builtin();
    let executor = MigrationExecutor::new(&registry);

    let report = executor.dry_run(&Version::zero(), &Version::new(1, 0, 0));
    assert!(report.ok);
    assert_eq!(report.steps.len(), 1);
    assert!(report.steps[0].has_down);
    assert!(report.steps[0].has_validate);
}
