//! Migration executor: path computation, forward application, rollback,
//! dry run, and audit-trail maintenance.
//!
//! All entry points return a [`MigrationResult`] value; nothing at this
//! boundary panics or propagates `Err` for document-level failures. A
//! chain that fails at any step discards its partial result entirely, and
//! a chain that fully applies is still re-validated before acceptance:
//! migration completion and acceptance are decoupled.

use chrono::Utc;
use errors::MigrationError;
use hf_core::{detect_settings_version, SettingsScope, Version, VersionedClaudeSettings};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use validation::{validate_settings, ValidationOptions};

use crate::registry::{Migration, MigrationRegistry};

// ============================================================================
// Results
// ============================================================================

/// Outcome of a migration or rollback.
///
/// `migrated_settings` is present exactly when `success` is true; a
/// partially migrated document is never surfaced. `applied_migrations`
/// lists the target versions whose transform took durable effect, in
/// application order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationResult {
    pub success: bool,
    pub migrated_settings: Option<VersionedClaudeSettings>,
    pub applied_migrations: Vec<String>,
    pub errors: Vec<String>,
}

impl MigrationResult {
    fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            migrated_settings: None,
            applied_migrations: Vec::new(),
            errors,
        }
    }
}

/// One step of a dry run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunStep {
    pub version: String,
    pub description: String,
    pub has_down: bool,
    pub has_validate: bool,
}

/// Structural preview of a migration chain.
///
/// This can only vouch for the chain's shape: that a path exists, reaches
/// the target, and which steps carry `down`/`validate`. It cannot
/// guarantee the transforms will semantically succeed on a given document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DryRunReport {
    pub from: String,
    pub to: String,
    pub steps: Vec<DryRunStep>,
    pub ok: bool,
    pub problems: Vec<String>,
}

// ============================================================================
// Executor
// ============================================================================

/// Applies registered migrations to settings documents.
///
/// Borrows its registry: the registry is built once at startup and shared
/// read-only, so one source of truth per process without a global.
pub struct MigrationExecutor<'a> {
    registry: &'a MigrationRegistry,
    options: ValidationOptions,
}

impl<'a> MigrationExecutor<'a> {
    pub fn new(registry: &'a MigrationRegistry) -> Self {
        Self {
            registry,
            options: ValidationOptions::default(),
        }
    }

    /// Use a non-default validation policy for the acceptance checks.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether `settings` is behind `target`.
    pub fn needs_migration(&self, settings: &Value, target: &Version) -> bool {
        detect_settings_version(settings) < *target
    }

    /// Migrate `settings` to `target`, tagging metadata with `scope`.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// The forward entry point: detects the current version, validates
    /// in place when already current (idempotent fast path, no mutation,
    /// no new audit record), otherwise applies the registered chain and
    /// re-validates the final document before accepting it.
    ///
    /// ## Error Handling
    /// Never panics. Transform failures, failed per-step self-checks,
    /// missing paths and post-migration validation failures all come back
    /// as `MigrationResult { success: false, .. }` with no
    /// `migrated_settings`.
    pub fn migrate(
        &self,
        settings: &Value,
        target: &Version,
        scope: SettingsScope,
    ) -> MigrationResult {
        let current = detect_settings_version(settings);
        if current >= *target {
            return self.fast_path(settings, &current, target);
        }

        let path = self.registry.migrations_for_range(&current, target);
        if !path.last().is_some_and(|m| m.version() == target) {
            let error = MigrationError::NoPathFound {
                from: current.to_string(),
                to: target.to_string(),
            };
            warn!(%current, %target, "no migration path");
            return MigrationResult::failure(vec![error.to_string()]);
        }

        info!(
            from = %current,
            to = %target,
            steps = path.len(),
            "migrating settings document"
        );

        let mut accumulator = settings.clone();
        for (step, migration) in path.iter().enumerate() {
            accumulator = match migration.apply_up(accumulator) {
                Ok(next) => next,
                Err(reason) => {
                    let error = MigrationError::StepFailed {
                        version: migration.version().to_string(),
                        step,
                        reason: reason.to_string(),
                    };
                    warn!(%error, "migration chain aborted");
                    return MigrationResult::failure(vec![error.to_string()]);
                }
            };
            if !migration.self_check(&accumulator) {
                let error = MigrationError::StepValidationFailed {
                    version: migration.version().to_string(),
                };
                warn!(%error, "migration chain aborted");
                return MigrationResult::failure(vec![error.to_string()]);
            }
            debug!(version = %migration.version(), "migration step applied");
        }

        if let Err(error) = append_audit_records(&mut accumulator, &path, scope) {
            return MigrationResult::failure(vec![error.to_string()]);
        }

        // Every step succeeded; acceptance is a separate gate.
        let validation = validate_settings(&accumulator, &self.options);
        if !validation.valid {
            warn!(
                errors = validation.errors.len(),
                "migrated document failed validation; discarding result"
            );
            return MigrationResult::failure(
                validation.errors.iter().map(|e| format!("{}: {}", e.path, e.message)).collect(),
            );
        }

        match serde_json::from_value::<VersionedClaudeSettings>(accumulator) {
            Ok(migrated) => MigrationResult {
                success: true,
                migrated_settings: Some(migrated),
                applied_migrations: path
                    .iter()
                    .map(|m| m.version().to_string())
                    .collect(),
                errors: Vec::new(),
            },
            Err(reason) => MigrationResult::failure(vec![
                MigrationError::MetadataRebuild {
                    reason: reason.to_string(),
                }
                .to_string(),
            ]),
        }
    }

    /// Roll `settings` back to `target`.
    ///
    /// All-or-nothing: every migration in `(target, current]` must carry a
    /// `down` transform or the rollback refuses to start. Each applied
    /// `down` also removes its version's audit record.
    pub fn rollback(&self, settings: &Value, target: &Version) -> MigrationResult {
        let current = detect_settings_version(settings);
        if *target >= current {
            let error = MigrationError::InvalidRollbackTarget {
                target: target.to_string(),
                current: current.to_string(),
            };
            return MigrationResult::failure(vec![error.to_string()]);
        }

        let mut path = self.registry.migrations_for_range(target, &current);
        if path.is_empty() {
            let error = MigrationError::NoPathFound {
                from: current.to_string(),
                to: target.to_string(),
            };
            return MigrationResult::failure(vec![error.to_string()]);
        }
        path.reverse();

        // Refuse before touching anything if any step cannot be undone.
        if let Some(stuck) = path.iter().find(|m| !m.has_down()) {
            let error = MigrationError::MissingRollback {
                version: stuck.version().to_string(),
            };
            warn!(%error, "rollback refused");
            return MigrationResult::failure(vec![error.to_string()]);
        }

        info!(from = %current, to = %target, steps = path.len(), "rolling back settings document");

        let mut accumulator = settings.clone();
        let mut rolled_back = Vec::new();
        for (step, migration) in path.iter().enumerate() {
            let down = migration
                .apply_down(accumulator)
                .expect("down presence checked before rollback started");
            accumulator = match down {
                Ok(next) => next,
                Err(reason) => {
                    let error = MigrationError::StepFailed {
                        version: migration.version().to_string(),
                        step,
                        reason: reason.to_string(),
                    };
                    warn!(%error, "rollback aborted");
                    return MigrationResult::failure(vec![error.to_string()]);
                }
            };
            remove_audit_record(&mut accumulator, migration.version());
            rolled_back.push(migration.version().to_string());
            debug!(version = %migration.version(), "rollback step applied");
        }

        if let Err(error) = finish_rollback(&mut accumulator, target) {
            return MigrationResult::failure(vec![error.to_string()]);
        }

        match serde_json::from_value::<VersionedClaudeSettings>(accumulator) {
            Ok(migrated) => MigrationResult {
                success: true,
                migrated_settings: Some(migrated),
                applied_migrations: rolled_back,
                errors: Vec::new(),
            },
            Err(reason) => MigrationResult::failure(vec![
                MigrationError::MetadataRebuild {
                    reason: reason.to_string(),
                }
                .to_string(),
            ]),
        }
    }

    /// Structural preview of the chain from `from` to `to`. Touches no
    /// document.
    pub fn dry_run(&self, from: &Version, to: &Version) -> DryRunReport {
        let mut problems = Vec::new();
        let path = self.registry.migrations_for_range(from, to);

        if *from >= *to {
            problems.push(format!("{from} is not below {to}; nothing to apply"));
        } else if path.is_empty() {
            problems.push(
                MigrationError::NoPathFound {
                    from: from.to_string(),
                    to: to.to_string(),
                }
                .to_string(),
            );
        } else if path.last().is_some_and(|m| m.version() != to) {
            problems.push(format!("{to} is not a registered migration target"));
        }

        let steps: Vec<DryRunStep> = path
            .iter()
            .map(|m| DryRunStep {
                version: m.version().to_string(),
                description: m.description().to_string(),
                has_down: m.has_down(),
                has_validate: m.has_validate(),
            })
            .collect();

        DryRunReport {
            from: from.to_string(),
            to: to.to_string(),
            ok: problems.is_empty(),
            steps,
            problems,
        }
    }

    /// Idempotent fast path: the document is already at or past the target.
    /// Validate as-is; no mutation, no audit record.
    fn fast_path(&self, settings: &Value, current: &Version, target: &Version) -> MigrationResult {
        debug!(%current, %target, "settings already current; validating in place");
        let validation = validate_settings(settings, &self.options);
        if !validation.valid {
            return MigrationResult::failure(
                validation
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.path, e.message))
                    .collect(),
            );
        }
        match serde_json::from_value::<VersionedClaudeSettings>(settings.clone()) {
            Ok(migrated) => MigrationResult {
                success: true,
                migrated_settings: Some(migrated),
                applied_migrations: Vec::new(),
                errors: Vec::new(),
            },
            Err(reason) => MigrationResult::failure(vec![
                MigrationError::MetadataRebuild {
                    reason: reason.to_string(),
                }
                .to_string(),
            ]),
        }
    }
}

// ============================================================================
// Audit-trail bookkeeping
// ============================================================================

/// Append one audit record per applied migration and refresh
/// `meta.updatedAt`/`meta.source`. Creates `meta` if the chain did not.
fn append_audit_records(
    value: &mut Value,
    applied: &[&Migration],
    scope: SettingsScope,
) -> Result<(), MigrationError> {
    let now = Utc::now();
    let object = value
        .as_object_mut()
        .ok_or_else(|| MigrationError::MetadataRebuild {
            reason: "migrated document is not a JSON object".to_string(),
        })?;

    let meta = object
        .entry("meta".to_string())
        .or_insert_with(|| json!({"createdAt": now}));
    let meta = meta
        .as_object_mut()
        .ok_or_else(|| MigrationError::MetadataRebuild {
            reason: "meta is not a JSON object".to_string(),
        })?;

    meta.entry("createdAt".to_string())
        .or_insert_with(|| json!(now));
    meta.insert("updatedAt".to_string(), json!(now));
    meta.insert("source".to_string(), json!(scope));

    let records = meta
        .entry("migrations".to_string())
        .or_insert_with(|| json!([]));
    let records = records
        .as_array_mut()
        .ok_or_else(|| MigrationError::MetadataRebuild {
            reason: "meta.migrations is not an array".to_string(),
        })?;

    for migration in applied {
        records.push(json!({
            "version": migration.version().to_string(),
            "appliedAt": now,
            "description": migration.description(),
            "changes": migration.changes(),
        }));
    }
    Ok(())
}

/// Drop the audit record belonging to a rolled-back migration, if the
/// document still carries metadata at all.
fn remove_audit_record(value: &mut Value, version: &Version) {
    let Some(records) = value
        .get_mut("meta")
        .and_then(|meta| meta.get_mut("migrations"))
        .and_then(Value::as_array_mut)
    else {
        return;
    };
    let version = version.to_string();
    records
        .retain(|record| record.get("version").and_then(Value::as_str) != Some(version.as_str()));
}

/// Final rollback bookkeeping: re-stamp `version` and refresh
/// `meta.updatedAt` on whatever envelope survived the downs.
fn finish_rollback(value: &mut Value, target: &Version) -> Result<(), MigrationError> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| MigrationError::MetadataRebuild {
            reason: "rolled-back document is not a JSON object".to_string(),
        })?;

    // A rollback all the way to 0.0.0 whose downs stripped the envelope has
    // produced a legacy document; stamping a version back on would re-version
    // it.
    if *target > Version::zero() || object.contains_key("version") {
        object.insert("version".to_string(), json!(target.to_string()));
    }
    if let Some(meta) = object.get_mut("meta").and_then(Value::as_object_mut) {
        meta.insert("updatedAt".to_string(), json!(Utc::now()));
    }
    Ok(())
}
