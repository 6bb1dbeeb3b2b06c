//! Version resolution for stored documents.
//!
//! `VersionService` decides which version a document has, which version it
//! should have, and which label to stamp after the next migration step. It
//! holds no per-call state: every answer is a function of the registered
//! chains, the two version locators and the configured field name.

use std::sync::Arc;

use docmig_core::{
    DocmigError, DocumentType, DocumentVersion, MigrationSettings, RawDocument, Result,
    VersionedDocument,
};
use serde_json::Value;

use crate::migration::{Migration, MigrationLocator, StaticVersionLocator, VersionLocator};

/// Resolves, validates and advances document schema versions.
///
/// # Example
///
/// ```ignore
/// let service = VersionService::builder()
///     .with_migration_locator(Arc::new(registry))
///     .with_runtime_locator(Arc::new(runtime_pins))
///     .build()?;
///
/// let stored = service.get_version_or_default(&record);
/// let target = service.current_or_latest_migration_version(&"Order".into());
/// ```
pub struct VersionService {
    version_field_name: String,
    migration_locator: Arc<dyn MigrationLocator>,
    runtime_locator: Arc<dyn VersionLocator>,
    startup_locator: Arc<dyn VersionLocator>,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService")
            .field("version_field_name", &self.version_field_name)
            .finish_non_exhaustive()
    }
}

impl VersionService {
    /// Creates a service. The field name is resolved here, once: the
    /// configured value if non-blank, else `"Version"`.
    pub fn new(
        migration_locator: Arc<dyn MigrationLocator>,
        runtime_locator: Arc<dyn VersionLocator>,
        startup_locator: Arc<dyn VersionLocator>,
        settings: &MigrationSettings,
    ) -> Self {
        Self {
            version_field_name: settings.resolved_version_field_name().to_string(),
            migration_locator,
            runtime_locator,
            startup_locator,
        }
    }

    /// Creates a new builder for constructing a `VersionService`.
    pub fn builder() -> VersionServiceBuilder {
        VersionServiceBuilder::new()
    }

    pub fn version_field_name(&self) -> &str {
        &self.version_field_name
    }

    pub fn migration_locator(&self) -> &dyn MigrationLocator {
        self.migration_locator.as_ref()
    }

    /// Reads the version stamp from a raw record.
    ///
    /// A missing, null, non-string or unparsable stamp yields the unset
    /// sentinel: the record is treated as needing migration from scratch.
    pub fn get_version_or_default(&self, record: &RawDocument) -> DocumentVersion {
        match self.try_get_version(record) {
            Ok(Some(version)) => version,
            Ok(None) => DocumentVersion::default(),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable '{}' field, treating document as unversioned: {}",
                    self.version_field_name,
                    e
                );
                DocumentVersion::default()
            }
        }
    }

    /// Strict variant of [`get_version_or_default`](Self::get_version_or_default).
    ///
    /// # Errors
    ///
    /// Returns `DocmigError::Format` when the field is present but is not a
    /// parsable version string.
    pub fn try_get_version(&self, record: &RawDocument) -> Result<Option<DocumentVersion>> {
        match record.get(&self.version_field_name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => DocumentVersion::parse(raw).map(Some),
            Some(other) => Err(DocmigError::format(
                other.to_string(),
                "version field is not a string",
            )),
        }
    }

    /// Writes `version` into the record's version field.
    pub fn set_version(&self, record: &mut RawDocument, version: DocumentVersion) {
        record.insert(
            self.version_field_name.clone(),
            Value::String(version.to_string()),
        );
    }

    /// The runtime pin for the type, else the latest migration version.
    ///
    /// This is the version the running process writes new documents at and
    /// migrates loaded documents to.
    pub fn current_or_latest_migration_version(
        &self,
        document_type: &DocumentType,
    ) -> DocumentVersion {
        self.runtime_locator
            .locate(document_type)
            .unwrap_or_else(|| self.migration_locator.latest_version(document_type))
    }

    /// The start-up pin for the type, else
    /// [`current_or_latest_migration_version`](Self::current_or_latest_migration_version).
    pub fn collection_version(&self, document_type: &DocumentType) -> DocumentVersion {
        self.startup_locator
            .locate(document_type)
            .unwrap_or_else(|| self.current_or_latest_migration_version(document_type))
    }

    /// Checks a typed instance's version before it is written.
    ///
    /// Leaves instances already at the runtime target or the latest version
    /// untouched and stamps unversioned instances. Downgrades never happen
    /// here.
    ///
    /// # Errors
    ///
    /// Returns `DocmigError::VersionViolation` when the instance carries a
    /// concrete version that is neither the runtime target nor the latest.
    pub fn determine_version<D: VersionedDocument>(&self, instance: &mut D) -> Result<()> {
        let document_type = D::document_type();
        let document = instance.version();
        let latest = self.migration_locator.latest_version(&document_type);
        let current = self.runtime_locator.locate(&document_type).unwrap_or(latest);

        if document == current || document == latest {
            tracing::debug!("{} document already at {}", document_type, document);
            return Ok(());
        }

        if document.is_default() {
            let stamp = if current < latest { current } else { latest };
            tracing::info!("Stamping new {} document with version {}", document_type, stamp);
            instance.set_version(stamp);
            return Ok(());
        }

        Err(DocmigError::VersionViolation {
            document_type,
            current,
            document,
            latest,
        })
    }

    /// The version label a document reaches after the step following
    /// `chain[index]`.
    ///
    /// Returns the next migration's version, or `version` unchanged when
    /// `index` is the last step. The caller is trusted to pass a consistent
    /// `(version, chain, index)` triple; an out-of-range index also yields
    /// `version`.
    pub fn determine_last_version(
        &self,
        version: DocumentVersion,
        chain: &[Arc<dyn Migration>],
        index: usize,
    ) -> DocumentVersion {
        match index.checked_add(1).and_then(|next| chain.get(next)) {
            Some(next) => next.version(),
            None => version,
        }
    }
}

/// Builder for constructing a `VersionService`.
///
/// The migration locator is required; both version locators default to
/// "no overrides" and settings default to `MigrationSettings::default()`.
pub struct VersionServiceBuilder {
    migration_locator: Option<Arc<dyn MigrationLocator>>,
    runtime_locator: Option<Arc<dyn VersionLocator>>,
    startup_locator: Option<Arc<dyn VersionLocator>>,
    settings: MigrationSettings,
}

impl VersionServiceBuilder {
    /// Creates a new builder with nothing set.
    pub fn new() -> Self {
        Self {
            migration_locator: None,
            runtime_locator: None,
            startup_locator: None,
            settings: MigrationSettings::default(),
        }
    }

    pub fn with_migration_locator(mut self, locator: Arc<dyn MigrationLocator>) -> Self {
        self.migration_locator = Some(locator);
        self
    }

    pub fn with_runtime_locator(mut self, locator: Arc<dyn VersionLocator>) -> Self {
        self.runtime_locator = Some(locator);
        self
    }

    pub fn with_startup_locator(mut self, locator: Arc<dyn VersionLocator>) -> Self {
        self.startup_locator = Some(locator);
        self
    }

    pub fn with_settings(mut self, settings: MigrationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the `VersionService`.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if no migration locator was provided.
    pub fn build(self) -> Result<VersionService> {
        let migration_locator = self
            .migration_locator
            .ok_or_else(|| DocmigError::config("Migration locator not set"))?;

        let runtime_locator = self
            .runtime_locator
            .unwrap_or_else(|| Arc::new(StaticVersionLocator::empty()));
        let startup_locator = self
            .startup_locator
            .unwrap_or_else(|| Arc::new(StaticVersionLocator::empty()));

        Ok(VersionService::new(
            migration_locator,
            runtime_locator,
            startup_locator,
            &self.settings,
        ))
    }
}

impl Default for VersionServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
