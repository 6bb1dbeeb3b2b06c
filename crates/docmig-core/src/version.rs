//! Schema version value type.
//!
//! A `DocumentVersion` is a `major.minor.revision` triple stored as a string in
//! each document record. `0.0.0` is reserved as the "never stamped" sentinel:
//! it sorts below every real version and no migration may target it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DocmigError, Result};

/// An ordered schema version for a stored document.
///
/// Ordering is lexicographic over `(major, minor, revision)`, which the derived
/// `Ord` gives us from the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentVersion {
    major: u64,
    minor: u64,
    revision: u64,
}

impl DocumentVersion {
    const DEFAULT: DocumentVersion = DocumentVersion::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, revision: u64) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    /// Parses a `M.m.r` string.
    ///
    /// Surrounding whitespace is ignored. Pre-release and build suffixes are
    /// rejected: a stored version names exactly one point in a migration chain.
    ///
    /// # Errors
    ///
    /// Returns `DocmigError::Format` for empty or malformed input.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DocmigError::format(input, "version string is empty"));
        }

        let parsed = semver::Version::parse(trimmed)
            .map_err(|e| DocmigError::format(input, e.to_string()))?;
        Self::try_from(parsed).map_err(|reason| DocmigError::format(input, reason))
    }

    /// The "never stamped" sentinel.
    pub const fn unset() -> Self {
        Self::DEFAULT
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for DocumentVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl FromStr for DocumentVersion {
    type Err = DocmigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentVersion {
    type Error = DocmigError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DocumentVersion> for String {
    fn from(version: DocumentVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<semver::Version> for DocumentVersion {
    type Error = String;

    fn try_from(version: semver::Version) -> std::result::Result<Self, String> {
        if !version.pre.is_empty() {
            return Err(format!("pre-release suffix '{}' is not allowed", version.pre));
        }
        if !version.build.is_empty() {
            return Err(format!("build metadata '{}' is not allowed", version.build));
        }
        Ok(Self::new(version.major, version.minor, version.patch))
    }
}

impl From<DocumentVersion> for semver::Version {
    fn from(version: DocumentVersion) -> Self {
        semver::Version::new(version.major, version.minor, version.revision)
    }
}
