//! Hook settings document types.
//!
//! These structs mirror the persisted JSON layout exactly. Four top-level
//! shapes are stable contract surface: `$schema` (URI string), `version`
//! (semver string), `hooks` (event-keyed configuration arrays) and
//! `meta.migrations` (ordered audit log). Unknown fields at every level are
//! carried through a flattened map so a round trip never drops caller data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Stable URI identifying the versioned settings schema.
///
/// Written into `$schema` by the first migration and never changed
/// afterwards; existing documents depend on it.
pub const SETTINGS_SCHEMA_URI: &str =
    "https://hookforge.dev/schemas/hook-settings.schema.json";

/// Lifecycle events a hook can be attached to.
///
/// Closed set: these nine names are the only legal keys of the `hooks`
/// mapping, and the schema validator enforces that.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    UserPromptSubmit,
    Notification,
    Stop,
    SubagentStop,
    SessionEnd,
    SessionStart,
    PreCompact,
}

impl HookEvent {
    /// All nine events, in declaration order.
    pub const ALL: [HookEvent; 9] = [
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::UserPromptSubmit,
        HookEvent::Notification,
        HookEvent::Stop,
        HookEvent::SubagentStop,
        HookEvent::SessionEnd,
        HookEvent::SessionStart,
        HookEvent::PreCompact,
    ];

    /// Whether configurations for this event carry a tool `matcher`.
    ///
    /// Only the tool-scoped events filter by tool name; everywhere else a
    /// matcher is inert and the rule validator leaves it alone.
    pub fn supports_matcher(self) -> bool {
        matches!(self, HookEvent::PreToolUse | HookEvent::PostToolUse)
    }
}

/// Tier a settings document belongs to, carried in `meta.source`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingsScope {
    Global,
    #[default]
    Project,
    Local,
}

/// Discriminant of a hook entry. Only command hooks exist today; the tag is
/// an enum so future hook kinds extend the wire format instead of breaking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookCommandType {
    Command,
}

/// A single command bound to a lifecycle event.
///
/// `command` may be empty and `timeout` (milliseconds) may be zero or
/// negative; those are structurally valid shapes. Semantic judgment lives in
/// the custom rule validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookCommand {
    #[serde(rename = "type")]
    pub command_type: HookCommandType,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HookCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command_type: HookCommandType::Command,
            command: command.into(),
            timeout: None,
            extra: Map::new(),
        }
    }
}

/// A matcher plus the ordered commands it triggers.
///
/// `hooks` order is execution order; no transform in this workspace may
/// reorder or deduplicate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
    pub hooks: Vec<HookCommand>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Event-keyed hook configurations.
pub type HookMap = BTreeMap<HookEvent, Vec<HookConfiguration>>;

/// A legacy (unversioned) settings document: hooks and nothing else we know
/// about. Documents in this shape detect as version `0.0.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClaudeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HookMap>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A versioned settings document.
///
/// After a successful migration `schema`, `version` and `meta` are always
/// present; `version` is `None` only on legacy documents that passed the
/// fast-path validation without ever being migrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedClaudeSettings {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HookMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SettingsMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Settings document metadata, maintained exclusively by the migration
/// executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsMeta {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: SettingsScope,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub migrations: Vec<MigrationRecord>,
}

/// Audit-log entry for one applied migration.
///
/// Append-only: never mutated after creation, removed only wholesale when
/// its owning migration is rolled back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    pub version: String,
    pub applied_at: DateTime<Utc>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
}
