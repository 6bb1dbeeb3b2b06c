//! Error types for docmig.

use thiserror::Error;

use crate::document::DocumentType;
use crate::version::DocumentVersion;

/// Direction a migration step was travelling when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    Up,
    Down,
}

impl std::fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "up"),
            MigrationDirection::Down => write!(f, "down"),
        }
    }
}

/// A shared error type for version resolution and migration sequencing.
///
/// Every variant is a per-document (or per-registration) failure; nothing in
/// this crate retries, so callers decide whether to skip the document or abort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocmigError {
    /// A stored or provided version string could not be parsed
    #[error("Invalid version '{input}': {reason}")]
    Format { input: String, reason: String },

    /// The document carries a version the running code neither targets nor can reach
    #[error(
        "Version violation for {document_type}: document is at {document}, \
         current version is {current}, latest migration is {latest}"
    )]
    VersionViolation {
        document_type: DocumentType,
        current: DocumentVersion,
        document: DocumentVersion,
        latest: DocumentVersion,
    },

    /// The document is newer than every migration registered for its type
    #[error(
        "Document of type {document_type} is at {document}, \
         newer than latest known migration {latest}"
    )]
    DocumentAhead {
        document_type: DocumentType,
        document: DocumentVersion,
        latest: DocumentVersion,
    },

    /// Two migrations for the same type target the same version
    #[error("Duplicate migration for {document_type} at version {version}")]
    DuplicateMigration {
        document_type: DocumentType,
        version: DocumentVersion,
    },

    /// A migration was registered with the unset sentinel as its target
    #[error("Migration for {document_type} cannot target the default version")]
    InvalidMigrationTarget { document_type: DocumentType },

    /// A migration step returned an error
    #[error("Migration {direction} to {version} failed for {document_type}: {message}")]
    MigrationFailed {
        document_type: DocumentType,
        version: DocumentVersion,
        direction: MigrationDirection,
        message: String,
    },

    /// A downgrade was requested through a migration without a reverse step
    #[error("Migration to {version} for {document_type} cannot be reversed")]
    Irreversible {
        document_type: DocumentType,
        version: DocumentVersion,
    },

    /// A field codec is already installed for this type name
    #[error("Field codec already registered for '{type_name}'")]
    AlreadyRegistered { type_name: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (settings file access)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },
}

impl DocmigError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Format error
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Check if this is a VersionViolation error
    pub fn is_version_violation(&self) -> bool {
        matches!(self, Self::VersionViolation { .. })
    }

    /// Check if this is an AlreadyRegistered error
    pub fn is_already_registered(&self) -> bool {
        matches!(self, Self::AlreadyRegistered { .. })
    }

    /// Check if this error came out of a migration step.
    pub fn is_migration_failure(&self) -> bool {
        matches!(
            self,
            Self::MigrationFailed { .. } | Self::Irreversible { .. } | Self::DocumentAhead { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DocmigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for DocmigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DocmigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DocmigError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, DocmigError>`.
pub type Result<T> = std::result::Result<T, DocmigError>;
