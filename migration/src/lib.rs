//! # Settings Migration
//!
//! Versioned migration engine for hook settings documents.
//!
//! This crate provides:
//! - A registry of version-to-version transforms (`registry`): an
//!   explicitly constructed value, not a process-global
//! - The built-in migration chain (`builtin`) that wraps legacy documents
//!   in the versioned envelope
//! - An executor (`executor`) that computes migration paths, applies and
//!   rolls back transforms, and maintains the audit trail in `meta.migrations`
//!
//! ## Design
//!
//! The engine supports a single linear version chain. The only legal
//! transitions are registered forward migrations (strictly increasing
//! version) and their `down` counterparts; targeting an unregistered
//! version is a terminal failure, never interpolation. A partially
//! migrated document is never surfaced as a success: failure mid-chain
//! discards the accumulator entirely, and even a chain that fully applies
//! is re-validated before it is accepted.

pub mod builtin;
pub mod executor;
pub mod registry;

pub use builtin::builtin_migrations;
pub use executor::{DryRunReport, DryRunStep, MigrationExecutor, MigrationResult};
pub use registry::{Migration, MigrationRegistry};
