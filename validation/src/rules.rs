//! Custom semantic rules the schema cannot express.
//!
//! Three families of checks, mirroring what actually breaks in the field:
//! matchers that do not compile as regular expressions, commands that look
//! destructive, and timeouts outside sane bounds. Findings never mutate the
//! document, and the dangerous-command heuristic never blocks on its own;
//! enforcement is the caller's policy, opted into via
//! [`ValidationOptions::strict`].

use std::str::FromStr;

use hf_core::HookEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

use crate::result::{ValidationIssue, ValidationOptions, ValidationResult};

/// Upper timeout bound: one hour, in milliseconds.
pub const MAX_TIMEOUT_MS: i64 = 3_600_000;

/// Destructive-operation heuristics, compiled once. Patterns target whole
/// classes of damage: recursive root deletion, raw block-device writes,
/// filesystem formatting, partitioning tools.
static DANGEROUS_COMMAND_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"\brm\s+(?:-[a-zA-Z]+\s+)*/(?:\s|$)",
            "recursive deletion from the filesystem root",
        ),
        (
            r"\bdd\s+[^|;&]*\bof=/dev/\w+",
            "raw write to a device node",
        ),
        (
            r">\s*/dev/(?:sd[a-z]|hd[a-z]|nvme\d+n\d+|disk\d+)",
            "redirect onto a block device",
        ),
        (r"\bmkfs(?:\.\w+)?\b", "filesystem formatting"),
        (r"\b(?:fdisk|parted|sgdisk)\b", "disk partitioning tool"),
    ]
    .into_iter()
    .map(|(pattern, label)| {
        (
            Regex::new(pattern).expect("dangerous-command pattern is valid"),
            label,
        )
    })
    .collect()
});

/// Run the semantic rules over a structurally parseable document.
///
/// Walks `hooks` event by event, configuration by configuration, hook by
/// hook; every finding carries a JSON-pointer path to the offending spot.
/// Unknown event keys are the schema tier's concern and are skipped here,
/// except that a near-miss on casing earns a suggestion.
pub fn validate_rules(value: &Value, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(hooks) = value.get("hooks").and_then(Value::as_object) else {
        return result;
    };

    for (event_name, configurations) in hooks {
        let Ok(event) = HookEvent::from_str(event_name) else {
            suggest_event_casing(event_name, &mut result);
            continue;
        };
        let Some(configurations) = configurations.as_array() else {
            continue;
        };
        for (config_index, configuration) in configurations.iter().enumerate() {
            let base = format!("/hooks/{event_name}/{config_index}");
            check_matcher(event, configuration, &base, &mut result);
            check_commands(configuration, &base, options, &mut result);
        }
    }
    result
}

/// Matchers only matter on tool events, and there they must compile.
fn check_matcher(event: HookEvent, configuration: &Value, base: &str, result: &mut ValidationResult) {
    if !event.supports_matcher() {
        return;
    }
    let Some(matcher) = configuration.get("matcher").and_then(Value::as_str) else {
        return;
    };
    if let Err(error) = Regex::new(matcher) {
        result.error(
            ValidationIssue::new(
                format!("{base}/matcher"),
                format!("matcher is not a valid regular expression: {error}"),
            )
            .with_value(json!(matcher)),
        );
    }
}

fn check_commands(
    configuration: &Value,
    base: &str,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    let Some(commands) = configuration.get("hooks").and_then(Value::as_array) else {
        return;
    };
    for (hook_index, hook) in commands.iter().enumerate() {
        let path = format!("{base}/hooks/{hook_index}");
        if let Some(command) = hook.get("command").and_then(Value::as_str) {
            check_dangerous_command(command, &path, options, result);
            if command.trim().is_empty() {
                result.warning(
                    ValidationIssue::new(
                        format!("{path}/command"),
                        "hook command is empty and will do nothing",
                    )
                    .with_value(json!(command)),
                );
                result.suggest(format!(
                    "remove the empty hook at {path} or give it a command"
                ));
            }
        }
        check_timeout(hook, &path, result);
    }
}

fn check_dangerous_command(
    command: &str,
    path: &str,
    options: &ValidationOptions,
    result: &mut ValidationResult,
) {
    for (pattern, label) in DANGEROUS_COMMAND_PATTERNS.iter() {
        if pattern.is_match(command) {
            warn!(%path, rule = label, "dangerous command pattern matched");
            let issue = ValidationIssue::new(
                format!("{path}/command"),
                format!("security: command matches dangerous pattern ({label})"),
            )
            .with_value(json!(command));
            // Advisory by default; strict mode escalates.
            if options.strict {
                result.error(issue);
            } else {
                result.warning(issue);
            }
        }
    }
}

fn check_timeout(hook: &Value, path: &str, result: &mut ValidationResult) {
    let Some(timeout) = hook.get("timeout") else {
        return;
    };
    // Integers beyond i64 only come from u64 range, which is over the
    // maximum anyway.
    let millis = timeout.as_i64().unwrap_or(i64::MAX);
    if !timeout.is_i64() && !timeout.is_u64() {
        return; // non-integer timeouts are the schema tier's finding
    }
    if millis < 0 {
        result.error(
            ValidationIssue::new(
                format!("{path}/timeout"),
                "timeout must be non-negative",
            )
            .with_value(timeout.clone())
            .with_expected(format!("0..={MAX_TIMEOUT_MS} milliseconds")),
        );
    } else if millis > MAX_TIMEOUT_MS {
        result.error(
            ValidationIssue::new(
                format!("{path}/timeout"),
                "timeout exceeds 1-hour maximum",
            )
            .with_value(timeout.clone())
            .with_expected(format!("0..={MAX_TIMEOUT_MS} milliseconds")),
        );
    } else if millis == 0 {
        result.suggest(format!(
            "timeout 0 at {path} disables the command timeout entirely"
        ));
    }
}

fn suggest_event_casing(event_name: &str, result: &mut ValidationResult) {
    let near_miss = HookEvent::ALL
        .into_iter()
        .find(|event| event.to_string().eq_ignore_ascii_case(event_name));
    if let Some(event) = near_miss {
        result.suggest(format!(
            "unknown hooks key {event_name:?}: did you mean {event:?}?"
        ));
    }
}
