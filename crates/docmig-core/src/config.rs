//! Migration settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::DocumentType;
use crate::error::Result;
use crate::version::DocumentVersion;

/// Field name used for the version stamp when none is configured.
pub const DEFAULT_VERSION_FIELD_NAME: &str = "Version";

/// Operator-facing settings for version resolution.
///
/// ```toml
/// version_field_name = "schema_version"
///
/// [runtime_versions]
/// Order = "1.5.0"
///
/// [startup_versions]
/// Order = "1.0.0"
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MigrationSettings {
    /// Record key carrying the version stamp. Blank means `"Version"`.
    pub version_field_name: String,
    /// Version the running code targets, per document type.
    pub runtime_versions: BTreeMap<String, String>,
    /// Operator pins reported as the collection version, per document type.
    pub startup_versions: BTreeMap<String, String>,
}

impl MigrationSettings {
    /// Parses settings from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes settings as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_version_field_name(mut self, name: impl Into<String>) -> Self {
        self.version_field_name = name.into();
        self
    }

    /// The configured field name, or `"Version"` if it is blank.
    pub fn resolved_version_field_name(&self) -> &str {
        if self.version_field_name.trim().is_empty() {
            DEFAULT_VERSION_FIELD_NAME
        } else {
            &self.version_field_name
        }
    }

    /// Runtime pins with their versions parsed.
    ///
    /// # Errors
    ///
    /// Returns `DocmigError::Format` naming the first pin that does not parse.
    pub fn runtime_pins(&self) -> Result<BTreeMap<DocumentType, DocumentVersion>> {
        parse_pins(&self.runtime_versions)
    }

    /// Start-up pins with their versions parsed.
    pub fn startup_pins(&self) -> Result<BTreeMap<DocumentType, DocumentVersion>> {
        parse_pins(&self.startup_versions)
    }
}

fn parse_pins(
    raw: &BTreeMap<String, String>,
) -> Result<BTreeMap<DocumentType, DocumentVersion>> {
    raw.iter()
        .map(|(ty, version)| {
            Ok((
                DocumentType::new(ty.as_str()),
                DocumentVersion::parse(version)?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_field_name_falls_back_to_default() {
        for blank in ["", "   ", "\t\n"] {
            let settings = MigrationSettings::default().with_version_field_name(blank);
            assert_eq!(settings.resolved_version_field_name(), "Version");
        }
    }

    #[test]
    fn test_configured_field_name_used_verbatim() {
        let settings = MigrationSettings::default().with_version_field_name("_schema");
        assert_eq!(settings.resolved_version_field_name(), "_schema");
    }

    #[test]
    fn test_from_toml_str_reads_pins() {
        let settings = MigrationSettings::from_toml_str(
            r#"
            version_field_name = "schema_version"

            [runtime_versions]
            Order = "1.5.0"

            [startup_versions]
            Order = "1.0.0"
            User = "3.0.0"
            "#,
        )
        .unwrap();

        assert_eq!(settings.resolved_version_field_name(), "schema_version");

        let runtime = settings.runtime_pins().unwrap();
        assert_eq!(runtime[&DocumentType::new("Order")], DocumentVersion::new(1, 5, 0));

        let startup = settings.startup_pins().unwrap();
        assert_eq!(startup.len(), 2);
        assert_eq!(startup[&DocumentType::new("User")], DocumentVersion::new(3, 0, 0));
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = MigrationSettings::from_toml_str("").unwrap();
        assert_eq!(settings, MigrationSettings::default());
        assert!(settings.runtime_pins().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_pin_is_a_format_error() {
        let settings = MigrationSettings::from_toml_str(
            r#"
            [runtime_versions]
            Order = "one"
            "#,
        )
        .unwrap();

        assert!(settings.runtime_pins().unwrap_err().is_format());
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        let err = MigrationSettings::from_toml_str("version_field_name = ").unwrap_err();
        assert!(matches!(
            err,
            crate::DocmigError::Serialization { ref format, .. } if format == "TOML"
        ));
    }
}
