//! Field codec registration at the storage boundary.
//!
//! The storage layer keeps a registry of codecs keyed by type name and uses
//! them to normalize stored field values on load and save. The version codec
//! must be installed exactly once per process; installing it again is
//! tolerated through [`ensure_version_codec`] and nowhere else.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use docmig_core::{DocmigError, DocumentVersion, Result};
use serde_json::Value;

/// Converts a stored field value to its canonical stored form.
pub trait FieldCodec: Send + Sync + std::fmt::Debug {
    /// Registry key for this codec.
    fn type_name(&self) -> &'static str;

    /// Validates `value` and returns its canonical representation.
    fn normalize(&self, value: &Value) -> Result<Value>;
}

/// Codec for `DocumentVersion` fields: canonical form is the `M.m.r` string.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionFieldCodec;

impl VersionFieldCodec {
    pub const TYPE_NAME: &'static str = "DocumentVersion";

    pub fn encode(&self, version: DocumentVersion) -> Value {
        Value::String(version.to_string())
    }

    /// Null decodes to the unset sentinel; anything else must be a version string.
    pub fn decode(&self, value: &Value) -> Result<DocumentVersion> {
        match value {
            Value::Null => Ok(DocumentVersion::default()),
            Value::String(raw) => DocumentVersion::parse(raw),
            other => Err(DocmigError::format(
                other.to_string(),
                "version field is not a string",
            )),
        }
    }
}

impl FieldCodec for VersionFieldCodec {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn normalize(&self, value: &Value) -> Result<Value> {
        self.decode(value).map(|version| self.encode(version))
    }
}

/// Registry of field codecs, one per type name.
#[derive(Debug, Default)]
pub struct FieldCodecRegistry {
    codecs: RwLock<HashMap<&'static str, Arc<dyn FieldCodec>>>,
}

static GLOBAL_REGISTRY: OnceLock<FieldCodecRegistry> = OnceLock::new();

impl FieldCodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by the storage layer.
    pub fn global() -> &'static FieldCodecRegistry {
        GLOBAL_REGISTRY.get_or_init(FieldCodecRegistry::new)
    }

    /// Installs a codec.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRegistered` if a codec already owns the type name.
    pub fn register(&self, codec: Arc<dyn FieldCodec>) -> Result<()> {
        let mut codecs = self
            .codecs
            .write()
            .map_err(|_| DocmigError::config("Field codec registry lock poisoned"))?;

        let type_name = codec.type_name();
        if codecs.contains_key(type_name) {
            return Err(DocmigError::AlreadyRegistered {
                type_name: type_name.to_string(),
            });
        }

        codecs.insert(type_name, codec);
        Ok(())
    }

    /// Looks up the codec for `type_name`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the registry lock is poisoned.
    pub fn get(&self, type_name: &str) -> Result<Option<Arc<dyn FieldCodec>>> {
        let codecs = self
            .codecs
            .read()
            .map_err(|_| DocmigError::config("Field codec registry lock poisoned"))?;
        Ok(codecs.get(type_name).cloned())
    }

    pub fn is_registered(&self, type_name: &str) -> Result<bool> {
        Ok(self.get(type_name)?.is_some())
    }

    /// Normalizes `value` with the codec registered for `type_name`.
    ///
    /// Values of types without a codec pass through unchanged.
    pub fn normalize(&self, type_name: &str, value: &Value) -> Result<Value> {
        match self.get(type_name)? {
            Some(codec) => codec.normalize(value),
            None => Ok(value.clone()),
        }
    }
}

/// Installs [`VersionFieldCodec`] unless it is already present.
///
/// Only `AlreadyRegistered` is swallowed; any other failure propagates.
pub fn ensure_version_codec(registry: &FieldCodecRegistry) -> Result<()> {
    match registry.register(Arc::new(VersionFieldCodec)) {
        Ok(()) => {
            tracing::debug!("Registered {} field codec", VersionFieldCodec::TYPE_NAME);
            Ok(())
        }
        Err(e) if e.is_already_registered() => {
            tracing::debug!(
                "{} field codec was already registered",
                VersionFieldCodec::TYPE_NAME
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_second_register_is_rejected() {
        let registry = FieldCodecRegistry::new();
        registry.register(Arc::new(VersionFieldCodec)).unwrap();

        let err = registry.register(Arc::new(VersionFieldCodec)).unwrap_err();
        assert!(err.is_already_registered());
    }

    #[test]
    fn test_ensure_version_codec_is_idempotent() {
        let registry = FieldCodecRegistry::new();
        assert!(!registry.is_registered(VersionFieldCodec::TYPE_NAME).unwrap());

        ensure_version_codec(&registry).unwrap();
        ensure_version_codec(&registry).unwrap();

        assert!(registry.is_registered(VersionFieldCodec::TYPE_NAME).unwrap());
    }

    #[test]
    fn test_global_registry_is_shared() {
        ensure_version_codec(FieldCodecRegistry::global()).unwrap();
        ensure_version_codec(FieldCodecRegistry::global()).unwrap();
        assert!(
            FieldCodecRegistry::global()
                .is_registered(VersionFieldCodec::TYPE_NAME)
                .unwrap()
        );
    }

    #[test]
    fn test_normalize_versions() {
        let registry = FieldCodecRegistry::new();
        ensure_version_codec(&registry).unwrap();

        assert_eq!(
            registry
                .normalize(VersionFieldCodec::TYPE_NAME, &json!(" 1.2.0 "))
                .unwrap(),
            json!("1.2.0")
        );
        assert_eq!(
            registry.normalize(VersionFieldCodec::TYPE_NAME, &Value::Null).unwrap(),
            json!("0.0.0")
        );
        assert!(
            registry
                .normalize(VersionFieldCodec::TYPE_NAME, &json!("1.x"))
                .unwrap_err()
                .is_format()
        );

        // Unregistered types pass through
        assert_eq!(registry.normalize("Other", &json!(42)).unwrap(), json!(42));
    }

    #[test]
    fn test_poisoned_registry_reports_error_on_lookup() {
        let registry = FieldCodecRegistry::new();
        ensure_version_codec(&registry).unwrap();

        std::thread::scope(|scope| {
            let poisoner = scope.spawn(|| {
                let _guard = registry.codecs.write().unwrap();
                panic!("poison the registry lock");
            });
            assert!(poisoner.join().is_err());
        });

        let err = registry
            .normalize(VersionFieldCodec::TYPE_NAME, &json!(" 1.2.0 "))
            .unwrap_err();
        assert!(matches!(err, DocmigError::Config(_)));
        assert!(registry.get(VersionFieldCodec::TYPE_NAME).is_err());
        assert!(ensure_version_codec(&registry).is_err());
    }
}
