//! Version resolution and migration sequencing for stored documents.
//!
//! [`MigrationRegistry`] holds the ordered migration chain per document type.
//! [`VersionService`] combines it with the runtime and start-up pins to decide
//! which version a document is at and which version it should be at.
//! [`DocumentMigrator`] walks loaded records along the chain. The `storage`
//! module loads settings from TOML and registers the version field codec.

pub mod document_migrator;
pub mod migration;
pub mod storage;
pub mod version_service;

pub use crate::document_migrator::{DocumentMigrator, MigrationOutcome};
pub use crate::migration::{
    Migration, MigrationLocator, MigrationRegistry, StaticVersionLocator, VersionLocator,
    build_version_service,
};
pub use crate::storage::{FieldCodecRegistry, SettingsStorage, ensure_version_codec};
pub use crate::version_service::{VersionService, VersionServiceBuilder};
