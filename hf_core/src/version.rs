//! Semantic version model for settings-schema versioning.
//!
//! The settings engine only ever deals in a single linear chain of schema
//! versions, but documents in the wild carry whatever string their writer
//! put there, so parsing is strict: three numeric segments, no leading
//! zeros, optional `-prerelease` and `+build` with non-empty identifiers.
//!
//! Precedence follows semver: the numeric core first, then "no prerelease
//! outranks any prerelease", then identifier-by-identifier prerelease
//! comparison. Build metadata never participates in ordering or equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use errors::VersionError;
use serde_json::Value;

/// A parsed semantic version.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Dot-separated prerelease identifiers, in order. Empty means "no
    /// prerelease", which ranks *above* any prerelease.
    pub pre: Vec<String>,
    /// Raw build metadata after `+`. Ignored by comparison and equality.
    pub build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: None,
        }
    }

    /// The version every unversioned legacy document detects as.
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse `MAJOR.MINOR.PATCH[-prerelease][+build]`.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.is_empty() {
            return Err(VersionError::Empty);
        }

        let (rest, build) = match input.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (input, None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let segments: Vec<&str> = core.split('.').collect();
        if segments.len() != 3 {
            return Err(VersionError::MalformedCore {
                input: input.to_string(),
            });
        }
        let major = parse_numeric_segment(segments[0], input)?;
        let minor = parse_numeric_segment(segments[1], input)?;
        let patch = parse_numeric_segment(segments[2], input)?;

        let pre = match pre {
            Some(pre) => parse_prerelease(pre, input)?,
            None => Vec::new(),
        };
        let build = match build {
            Some(build) => Some(parse_build(build, input)?),
            None => None,
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
            build,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Semver precedence: numeric core, then prerelease rules. Build
    /// metadata is not consulted.
    fn cmp_precedence(&self, other: &Self) -> Ordering {
        let core = (self.major, self.minor, self.patch).cmp(&(
            other.major,
            other.minor,
            other.patch,
        ));
        if core != Ordering::Equal {
            return core;
        }
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            // Absence of a prerelease ranks higher than presence.
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => cmp_prerelease(&self.pre, &other.pre),
        }
    }
}

fn parse_numeric_segment(segment: &str, input: &str) -> Result<u64, VersionError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidSegment {
            segment: segment.to_string(),
            input: input.to_string(),
        });
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(VersionError::LeadingZero {
            segment: segment.to_string(),
            input: input.to_string(),
        });
    }
    segment
        .parse::<u64>()
        .map_err(|_| VersionError::InvalidSegment {
            segment: segment.to_string(),
            input: input.to_string(),
        })
}

fn parse_prerelease(pre: &str, input: &str) -> Result<Vec<String>, VersionError> {
    let invalid = || VersionError::InvalidPrerelease {
        input: input.to_string(),
    };
    let mut identifiers = Vec::new();
    for id in pre.split('.') {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(invalid());
        }
        let numeric = id.bytes().all(|b| b.is_ascii_digit());
        if numeric && id.len() > 1 && id.starts_with('0') {
            return Err(invalid());
        }
        identifiers.push(id.to_string());
    }
    Ok(identifiers)
}

fn parse_build(build: &str, input: &str) -> Result<String, VersionError> {
    let valid = !build.is_empty()
        && build.split('.').all(|id| {
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        });
    if valid {
        Ok(build.to_string())
    } else {
        Err(VersionError::InvalidBuild {
            input: input.to_string(),
        })
    }
}

fn cmp_prerelease(a: &[String], b: &[String]) -> Ordering {
    for (left, right) in a.iter().zip(b.iter()) {
        let ordering = match (parse_all_digits(left), parse_all_digits(right)) {
            (Some(l), Some(r)) => l.cmp(&r),
            // Numeric identifiers rank below alphanumeric ones.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => left.cmp(right),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    // Common prefix equal: the longer identifier list ranks higher.
    a.len().cmp(&b.len())
}

fn parse_all_digits(id: &str) -> Option<u64> {
    if id.bytes().all(|b| b.is_ascii_digit()) {
        id.parse().ok()
    } else {
        None
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_precedence(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_precedence(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre.join("."))?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Detect the schema version of an arbitrary JSON value.
///
/// Total by contract: never fails and never yields an unparseable version.
/// Non-objects and unversioned legacy documents detect as `0.0.0`; a
/// parseable `version` string wins; otherwise the presence of `meta` or
/// `$schema` marks a versioned-but-unlabeled document as `1.0.0`.
pub fn detect_settings_version(value: &Value) -> Version {
    let Some(object) = value.as_object() else {
        return Version::zero();
    };
    if let Some(version) = object.get("version").and_then(Value::as_str) {
        if let Ok(parsed) = Version::parse(version) {
            return parsed;
        }
    }
    if object.contains_key("meta") || object.contains_key("$schema") {
        return Version::new(1, 0, 0);
    }
    Version::zero()
}
