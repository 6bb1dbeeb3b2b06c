//! Migration chains and version locators.
//!
//! Each document type owns a linear chain of migrations ordered by the version
//! they produce. Chains are registered once at start-up into a
//! `MigrationRegistry`, then shared read-only with the version service.
//!
//! ```text
//! MigrationRegistry
//!   Order: 1.0.0 -> 1.1.0 -> 2.0.0
//!   User:  1.0.0 -> 3.0.0
//!          │
//!          V
//! VersionService <── runtime locator (pins the version code targets)
//!          │     <── start-up locator (operator pin for collection version)
//!          V
//! DocumentMigrator (applies up/down per document on load)
//! ```

mod locator;
mod registry;
mod traits;

pub use locator::{StaticVersionLocator, VersionLocator};
pub use registry::MigrationRegistry;
pub use traits::{Migration, MigrationLocator};

use std::sync::Arc;

use docmig_core::{MigrationSettings, Result};

use crate::version_service::VersionService;

/// Builds a `VersionService` from a populated registry and settings.
///
/// The runtime and start-up locators are built from the settings' pins.
///
/// # Errors
///
/// Returns a `Format` error if any configured pin is not a valid version.
///
/// # Example
///
/// ```ignore
/// let mut registry = MigrationRegistry::new();
/// registry.register_all(order_migrations())?;
///
/// let settings = SettingsStorage::new(path).load()?;
/// let service = build_version_service(registry, &settings)?;
/// ```
pub fn build_version_service(
    registry: MigrationRegistry,
    settings: &MigrationSettings,
) -> Result<VersionService> {
    let runtime_locator = StaticVersionLocator::from_pins(settings.runtime_pins()?);
    let startup_locator = StaticVersionLocator::from_pins(settings.startup_pins()?);

    if registry.is_empty() {
        tracing::warn!("Migration registry is empty");
    } else {
        tracing::debug!(
            "Migration registry: {} migrations across {} document types",
            registry.len(),
            registry.document_types().len()
        );
    }

    VersionService::builder()
        .with_migration_locator(Arc::new(registry))
        .with_runtime_locator(Arc::new(runtime_locator))
        .with_startup_locator(Arc::new(startup_locator))
        .with_settings(settings.clone())
        .build()
}
