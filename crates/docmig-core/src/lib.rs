//! Core types for per-document schema versioning.
//!
//! This crate holds the pieces every layer agrees on: the version value type,
//! document identity, settings and the shared error type. Resolution and
//! migration sequencing live in `docmig-infrastructure`.

pub mod config;
pub mod document;
pub mod error;
pub mod version;

pub use config::{DEFAULT_VERSION_FIELD_NAME, MigrationSettings};
pub use document::{DocumentType, RawDocument, VersionedDocument};
pub use error::{DocmigError, MigrationDirection, Result};
pub use version::DocumentVersion;
