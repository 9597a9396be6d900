//! # Hookforge Errors
//!
//! Error taxonomy for the versioned settings engine.
//!
//! Two rules govern error flow in this workspace:
//! - Validation and version *detection* never fail: findings are returned as
//!   data (`ValidationResult`), and detection always produces a usable
//!   version. The enums here cover the operations that genuinely cannot
//!   proceed: parsing a malformed version string, or executing a migration
//!   chain that is broken.
//! - Migration transforms are fallible, but their errors are caught by the
//!   executor and folded into a `MigrationResult` value at the public
//!   boundary. A broken transform must not take the host process down.

use thiserror::Error;

/// Semantic version parsing errors.
///
/// Produced by `hf_core::Version::parse`. Each variant names the part of the
/// input that violated the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,

    #[error("Malformed version core: expected MAJOR.MINOR.PATCH in {input:?}")]
    MalformedCore { input: String },

    #[error("Non-numeric version segment {segment:?} in {input:?}")]
    InvalidSegment { segment: String, input: String },

    #[error("Leading zero in version segment {segment:?} in {input:?}")]
    LeadingZero { segment: String, input: String },

    #[error("Empty or invalid prerelease identifier in {input:?}")]
    InvalidPrerelease { input: String },

    #[error("Empty or invalid build identifier in {input:?}")]
    InvalidBuild { input: String },
}

/// Migration registry and executor errors.
///
/// The executor converts these into `MigrationResult { success: false, .. }`
/// at the public boundary; they surface directly only from registry
/// construction (`register`) where failing fast is the right call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("No migration path found from {from} to {to}")]
    NoPathFound { from: String, to: String },

    #[error("Migration for target version {version} is already registered")]
    DuplicateVersion { version: String },

    #[error("Migration to {version} (step {step}) failed: {reason}")]
    StepFailed {
        version: String,
        step: usize,
        reason: String,
    },

    #[error("Migration to {version} produced a document that failed its own validation")]
    StepValidationFailed { version: String },

    #[error("Cannot roll back past {version}: migration has no down transform")]
    MissingRollback { version: String },

    #[error("Rollback target {target} is not below current version {current}")]
    InvalidRollbackTarget { target: String, current: String },

    #[error("Migrated document failed settings validation: {reason}")]
    PostValidationFailed { reason: String },

    #[error("Migrated document metadata is malformed: {reason}")]
    MetadataRebuild { reason: String },
}
