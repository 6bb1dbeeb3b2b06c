//! Migration registry holding one ordered chain per document type.
//!
//! Registration happens once at start-up on an owned registry; afterwards the
//! registry is shared read-only (usually behind an `Arc`) and answers
//! `MigrationLocator` queries.

use std::collections::HashMap;
use std::sync::Arc;

use docmig_core::{DocmigError, DocumentType, Result};

use super::traits::{Migration, MigrationLocator};

/// Registry for the migration chains of every known document type.
///
/// Each chain is kept sorted by target version, whatever order migrations are
/// registered in, and never holds two migrations with the same version.
///
/// # Example
///
/// ```ignore
/// let mut registry = MigrationRegistry::new();
/// registry.register(Arc::new(OrderAddCurrency))?;   // Order 1.1.0
/// registry.register(Arc::new(OrderInitial))?;       // Order 1.0.0
///
/// assert_eq!(registry.latest_version(&"Order".into()), DocumentVersion::new(1, 1, 0));
/// ```
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    chains: HashMap<DocumentType, Vec<Arc<dyn Migration>>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single migration into its type's chain.
    ///
    /// # Errors
    ///
    /// - `InvalidMigrationTarget` if the migration targets the unset sentinel
    /// - `DuplicateMigration` if the chain already has a migration at that version
    pub fn register(&mut self, migration: Arc<dyn Migration>) -> Result<()> {
        let document_type = migration.document_type();
        let version = migration.version();

        if version.is_default() {
            return Err(DocmigError::InvalidMigrationTarget { document_type });
        }

        let chain = self.chains.entry(document_type.clone()).or_default();
        match chain.binary_search_by(|m| m.version().cmp(&version)) {
            Ok(_) => Err(DocmigError::DuplicateMigration {
                document_type,
                version,
            }),
            Err(index) => {
                tracing::debug!(
                    "Registered migration {} -> {} ({})",
                    document_type,
                    version,
                    migration.description()
                );
                chain.insert(index, migration);
                Ok(())
            }
        }
    }

    /// Registers multiple migrations, stopping at the first rejected one.
    pub fn register_all(&mut self, migrations: Vec<Arc<dyn Migration>>) -> Result<()> {
        for migration in migrations {
            self.register(migration)?;
        }
        Ok(())
    }

    /// Returns true if no migrations are registered.
    pub fn is_empty(&self) -> bool {
        self.chains.values().all(Vec::is_empty)
    }

    /// Returns the number of registered migrations across all types.
    pub fn len(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }

    /// Document types with at least one registered migration, sorted.
    pub fn document_types(&self) -> Vec<DocumentType> {
        let mut types: Vec<DocumentType> = self
            .chains
            .iter()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(ty, _)| ty.clone())
            .collect();
        types.sort();
        types
    }
}

impl MigrationLocator for MigrationRegistry {
    fn migration_chain(&self, document_type: &DocumentType) -> &[Arc<dyn Migration>] {
        self.chains
            .get(document_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
