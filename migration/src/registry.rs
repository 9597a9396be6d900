//! Migration catalogue.
//!
//! A registry is an ordered set of transforms, each keyed by the version it
//! *produces*. It is built once at startup (usually via
//! [`MigrationRegistry::with_builtin`]) and passed by reference into the
//! executor; there is deliberately no global registry.

use errors::MigrationError;
use hf_core::Version;
use serde_json::Value;

/// A fallible settings transform. Errors are caught by the executor and
/// folded into the migration result; a transform cannot crash the host.
pub type TransformFn = Box<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// A post-step self-check. Returning `false` aborts the whole chain.
pub type ValidateFn = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// One registered version-to-version transform.
pub struct Migration {
    version: Version,
    description: String,
    changes: Vec<String>,
    up: TransformFn,
    down: Option<TransformFn>,
    validate: Option<ValidateFn>,
}

impl Migration {
    pub fn new(
        version: Version,
        description: impl Into<String>,
        up: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            changes: Vec::new(),
            up: Box::new(up),
            down: None,
            validate: None,
        }
    }

    /// Change descriptions copied into the audit record on application.
    pub fn with_changes(mut self, changes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.changes = changes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_down(
        mut self,
        down: impl Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.down = Some(Box::new(down));
        self
    }

    pub fn with_validate(
        mut self,
        validate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn changes(&self) -> &[String] {
        &self.changes
    }

    pub fn has_down(&self) -> bool {
        self.down.is_some()
    }

    pub fn has_validate(&self) -> bool {
        self.validate.is_some()
    }

    pub(crate) fn apply_up(&self, value: Value) -> anyhow::Result<Value> {
        (self.up)(value)
    }

    pub(crate) fn apply_down(&self, value: Value) -> Option<anyhow::Result<Value>> {
        self.down.as_ref().map(|down| down(value))
    }

    /// Run the migration's self-check, if it declares one.
    pub(crate) fn self_check(&self, value: &Value) -> bool {
        self.validate.as_ref().is_none_or(|validate| validate(value))
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version.to_string())
            .field("description", &self.description)
            .field("has_down", &self.has_down())
            .field("has_validate", &self.has_validate())
            .finish()
    }
}

/// Ordered catalogue of migrations, keyed by target version.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    /// Kept sorted ascending by target version at all times.
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// A registry preloaded with the built-in chain.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for migration in crate::builtin::builtin_migrations() {
            registry
                .register(migration)
                .expect("builtin migration chain has unique target versions");
        }
        registry
    }

    /// Register a migration. The target version must be unique.
    pub fn register(&mut self, migration: Migration) -> Result<(), MigrationError> {
        match self
            .migrations
            .binary_search_by(|existing| existing.version.cmp(&migration.version))
        {
            Ok(_) => Err(MigrationError::DuplicateVersion {
                version: migration.version.to_string(),
            }),
            Err(position) => {
                self.migrations.insert(position, migration);
                Ok(())
            }
        }
    }

    /// All migrations, ascending by target version regardless of
    /// registration order.
    pub fn all_migrations(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    /// The subsequence with `from < version <= to`, ascending.
    pub fn migrations_for_range(&self, from: &Version, to: &Version) -> Vec<&Migration> {
        self.migrations
            .iter()
            .filter(|m| m.version > *from && m.version <= *to)
            .collect()
    }

    pub fn get(&self, version: &Version) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.version == *version)
    }

    /// Highest registered target version, or `0.0.0` for an empty registry.
    pub fn latest_version(&self) -> Version {
        self.migrations
            .last()
            .map_or_else(Version::zero, |m| m.version.clone())
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
