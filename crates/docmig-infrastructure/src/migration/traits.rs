//! Core traits for the migration framework.
//!
//! A migration is one step in a per-type chain: it knows which document type it
//! belongs to, the version it leaves a document at, and how to rewrite a raw
//! record in place.

use std::sync::Arc;

use docmig_core::{DocumentType, DocumentVersion, RawDocument};

/// A single versioned transformation for one document type.
pub trait Migration: Send + Sync + std::fmt::Debug {
    /// The document type this migration belongs to.
    fn document_type(&self) -> DocumentType;

    /// The version a document is at after `up` has run.
    fn version(&self) -> DocumentVersion;

    /// Returns a human-readable description of this migration.
    ///
    /// Used for logging and debugging purposes.
    fn description(&self) -> &str {
        ""
    }

    /// Upgrades the record from the previous version to `version()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be transformed; the caller stops
    /// the chain at this step.
    fn up(&self, document: &mut RawDocument) -> anyhow::Result<()>;

    /// Whether `down` is implemented.
    fn is_reversible(&self) -> bool {
        false
    }

    /// Reverts the record from `version()` to the previous version.
    fn down(&self, _document: &mut RawDocument) -> anyhow::Result<()> {
        anyhow::bail!("migration to {} has no down step", self.version())
    }
}

/// Looks up the ordered migration chain registered for a document type.
pub trait MigrationLocator: Send + Sync {
    /// Migrations for `document_type`, ascending by version. Empty if none.
    fn migration_chain(&self, document_type: &DocumentType) -> &[Arc<dyn Migration>];

    /// Highest version any migration for `document_type` reaches, or the
    /// unset sentinel when nothing is registered.
    fn latest_version(&self, document_type: &DocumentType) -> DocumentVersion {
        self.migration_chain(document_type)
            .last()
            .map(|m| m.version())
            .unwrap_or_default()
    }

    /// Ascending migrations with `from < version <= to`.
    fn migrations_between(
        &self,
        document_type: &DocumentType,
        from: DocumentVersion,
        to: DocumentVersion,
    ) -> Vec<Arc<dyn Migration>> {
        self.migration_chain(document_type)
            .iter()
            .filter(|m| {
                let version = m.version();
                version > from && version <= to
            })
            .cloned()
            .collect()
    }
}
