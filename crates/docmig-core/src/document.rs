//! Document identity and the versioned-document contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::DocumentVersion;

/// An untyped document record as the storage layer hands it over.
pub type RawDocument = serde_json::Map<String, serde_json::Value>;

/// Stable identifier for a document type (e.g. `"Order"`).
///
/// Migration chains and version pins are keyed by this rather than by the Rust
/// type, so operators can name types in configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentType(String);

impl DocumentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DocumentType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A typed document that carries its own schema version.
///
/// The version service only reads and writes the version; the application
/// owns the instance.
///
/// # Example
///
/// ```
/// use docmig_core::{DocumentVersion, VersionedDocument};
///
/// struct Order {
///     version: DocumentVersion,
///     total: u64,
/// }
///
/// impl VersionedDocument for Order {
///     const DOCUMENT_TYPE: &'static str = "Order";
///
///     fn version(&self) -> DocumentVersion {
///         self.version
///     }
///
///     fn set_version(&mut self, version: DocumentVersion) {
///         self.version = version;
///     }
/// }
///
/// let order = Order { version: DocumentVersion::default(), total: 10 };
/// assert_eq!(Order::document_type().as_str(), "Order");
/// assert!(order.version().is_default());
/// ```
pub trait VersionedDocument {
    /// The type identifier chains and pins are registered under.
    const DOCUMENT_TYPE: &'static str;

    fn version(&self) -> DocumentVersion;

    fn set_version(&mut self, version: DocumentVersion);

    fn document_type() -> DocumentType {
        DocumentType::new(Self::DOCUMENT_TYPE)
    }
}
