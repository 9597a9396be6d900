//! # Hookforge Core
//!
//! Shared types, version model, and type guards for the settings engine.
//!
//! This crate provides:
//! - Type definitions for hook settings documents (events, commands,
//!   configurations, versioned metadata)
//! - The semantic version model used for settings-schema versioning
//! - Total, non-panicking type guards for untrusted JSON values
//!
//! Everything here is pure and synchronous. Nothing in this crate touches
//! the filesystem or the network; documents arrive and leave as in-memory
//! values.

pub mod guards;
pub mod types;
pub mod version;

// Re-export commonly used types for convenience
pub use types::{
    ClaudeSettings, HookCommand, HookCommandType, HookConfiguration, HookEvent, MigrationRecord,
    SettingsMeta, SettingsScope, VersionedClaudeSettings, SETTINGS_SCHEMA_URI,
};
pub use version::{detect_settings_version, Version};
