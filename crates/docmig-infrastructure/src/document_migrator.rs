//! Lazy, per-document migration on the load path.
//!
//! `DocumentMigrator` walks a raw record along its type's chain until it sits
//! at the version the running process targets. Upgrades apply `up` in
//! ascending order; downgrades (a runtime pin below the stored version) apply
//! `down` in descending order. The record is re-stamped after every step, so
//! a failure leaves it labelled with the last version it actually reached.

use std::sync::Arc;

use docmig_core::{
    DocmigError, DocumentType, DocumentVersion, MigrationDirection, RawDocument, Result,
    VersionedDocument,
};

use crate::migration::Migration;
use crate::version_service::VersionService;

/// What [`DocumentMigrator::migrate`] did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The record was already at the target.
    Unchanged(DocumentVersion),
    Upgraded {
        from: DocumentVersion,
        to: DocumentVersion,
    },
    Downgraded {
        from: DocumentVersion,
        to: DocumentVersion,
    },
}

/// Applies migrations to individual documents as they are loaded or saved.
#[derive(Debug, Clone)]
pub struct DocumentMigrator {
    service: Arc<VersionService>,
}

impl DocumentMigrator {
    pub fn new(service: Arc<VersionService>) -> Self {
        Self { service }
    }

    pub fn version_service(&self) -> &VersionService {
        &self.service
    }

    /// Brings a loaded record to the version the running process targets.
    ///
    /// # Errors
    ///
    /// - `DocumentAhead` if the record is newer than every known migration
    /// - `Irreversible` if a downgrade step has no `down`
    /// - `MigrationFailed` if a step returns an error
    pub fn migrate(
        &self,
        document_type: &DocumentType,
        record: &mut RawDocument,
    ) -> Result<MigrationOutcome> {
        let document = self.service.get_version_or_default(record);
        let target = self.service.current_or_latest_migration_version(document_type);

        if document == target {
            tracing::debug!(
                "{} document already at target version {}, no migration needed",
                document_type,
                document
            );
            return Ok(MigrationOutcome::Unchanged(document));
        }

        let latest = self.service.migration_locator().latest_version(document_type);
        if document > latest {
            return Err(DocmigError::DocumentAhead {
                document_type: document_type.clone(),
                document,
                latest,
            });
        }

        if document < target {
            // A pin above every migration settles on latest, as the save path does.
            let reached = if target < latest { target } else { latest };
            self.migrate_up(document_type, record, document, reached)
        } else {
            self.migrate_down(document_type, record, document, target)
        }
    }

    /// Save-path check for a typed instance; see
    /// [`VersionService::determine_version`].
    pub fn prepare_for_insert<D: VersionedDocument>(&self, instance: &mut D) -> Result<()> {
        self.service.determine_version(instance)
    }

    fn migrate_up(
        &self,
        document_type: &DocumentType,
        record: &mut RawDocument,
        from: DocumentVersion,
        to: DocumentVersion,
    ) -> Result<MigrationOutcome> {
        if from == to {
            return Ok(MigrationOutcome::Unchanged(from));
        }

        let steps = self
            .service
            .migration_locator()
            .migrations_between(document_type, from, to);

        if steps.is_empty() {
            tracing::debug!(
                "No {} migrations between {} and {}, relabelling",
                document_type,
                from,
                to
            );
            self.service.set_version(record, to);
            return Ok(MigrationOutcome::Upgraded { from, to });
        }

        tracing::info!(
            "Migrating {} document up from {} to {} ({} steps)",
            document_type,
            from,
            to,
            steps.len()
        );

        for (i, step) in steps.iter().enumerate() {
            tracing::info!(
                "Migration step {}/{}: {} -> {} ({})",
                i + 1,
                steps.len(),
                document_type,
                step.version(),
                step.description()
            );

            step.up(record)
                .map_err(|e| step_failed(&**step, MigrationDirection::Up, e))?;

            // The last step lands on the target even when the target sits
            // between two chain points.
            let reached = if i + 1 == steps.len() {
                to
            } else {
                step.version()
            };
            self.service.set_version(record, reached);
        }

        Ok(MigrationOutcome::Upgraded { from, to })
    }

    fn migrate_down(
        &self,
        document_type: &DocumentType,
        record: &mut RawDocument,
        from: DocumentVersion,
        to: DocumentVersion,
    ) -> Result<MigrationOutcome> {
        let mut steps = self
            .service
            .migration_locator()
            .migrations_between(document_type, to, from);
        steps.reverse();

        if steps.is_empty() {
            tracing::debug!(
                "No {} migrations between {} and {}, relabelling",
                document_type,
                to,
                from
            );
            self.service.set_version(record, to);
            return Ok(MigrationOutcome::Downgraded { from, to });
        }

        tracing::info!(
            "Migrating {} document down from {} to {} ({} steps)",
            document_type,
            from,
            to,
            steps.len()
        );

        for (index, step) in steps.iter().enumerate() {
            if !step.is_reversible() {
                return Err(DocmigError::Irreversible {
                    document_type: step.document_type(),
                    version: step.version(),
                });
            }

            step.down(record)
                .map_err(|e| step_failed(&**step, MigrationDirection::Down, e))?;

            let reached = self.service.determine_last_version(to, &steps, index);
            tracing::info!(
                "Reverted {} migration {}, document now at {}",
                document_type,
                step.version(),
                reached
            );
            self.service.set_version(record, reached);
        }

        Ok(MigrationOutcome::Downgraded { from, to })
    }
}

fn step_failed(
    step: &dyn Migration,
    direction: MigrationDirection,
    err: anyhow::Error,
) -> DocmigError {
    DocmigError::MigrationFailed {
        document_type: step.document_type(),
        version: step.version(),
        direction,
        message: format!("{err:#}"),
    }
}
