//! Version locators: optional per-type overrides of the migration chain.
//!
//! Two locators are consulted by the version service. The runtime locator
//! names the version the running code targets for a type (it may trail the
//! newest migration during a rolling deployment). The start-up locator is an
//! operator pin reported as the collection version. `None` means "no
//! opinion, defer to the chain".

use std::collections::BTreeMap;

use docmig_core::{DocumentType, DocumentVersion};

/// Pluggable per-type version override.
pub trait VersionLocator: Send + Sync {
    /// Returns the pinned version for `document_type`, if any.
    ///
    /// Unknown types are not an error.
    fn locate(&self, document_type: &DocumentType) -> Option<DocumentVersion>;
}

/// Version locator backed by a fixed map of pins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticVersionLocator {
    pins: BTreeMap<DocumentType, DocumentVersion>,
}

impl StaticVersionLocator {
    /// A locator with no overrides.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pins(pins: BTreeMap<DocumentType, DocumentVersion>) -> Self {
        Self { pins }
    }

    pub fn with_pin(
        mut self,
        document_type: impl Into<DocumentType>,
        version: DocumentVersion,
    ) -> Self {
        self.pins.insert(document_type.into(), version);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl VersionLocator for StaticVersionLocator {
    fn locate(&self, document_type: &DocumentType) -> Option<DocumentVersion> {
        self.pins.get(document_type).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_has_no_opinion() {
        let locator = StaticVersionLocator::empty();
        assert!(locator.is_empty());
        assert_eq!(locator.locate(&DocumentType::new("Order")), None);
    }

    #[test]
    fn test_pin_is_returned_even_when_default() {
        // A pin equal to the sentinel is still a pin, distinct from "absent".
        let locator = StaticVersionLocator::empty()
            .with_pin("Order", DocumentVersion::new(1, 5, 0))
            .with_pin("Legacy", DocumentVersion::default());

        assert_eq!(
            locator.locate(&DocumentType::new("Order")),
            Some(DocumentVersion::new(1, 5, 0))
        );
        assert_eq!(
            locator.locate(&DocumentType::new("Legacy")),
            Some(DocumentVersion::default())
        );
        assert_eq!(locator.locate(&DocumentType::new("User")), None);
    }
}
