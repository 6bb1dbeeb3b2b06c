//! Settings file storage.
//!
//! Loads `MigrationSettings` from a TOML file and writes it back atomically
//! (tmp file + fsync + rename). A missing or empty file means defaults.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use docmig_core::{DocmigError, MigrationSettings, Result};

/// A handle to the migration settings file.
pub struct SettingsStorage {
    path: PathBuf,
}

impl SettingsStorage {
    /// Creates a new settings storage handle.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the settings file (usually a .toml file)
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults when the file does not exist
    /// or is blank.
    pub fn load(&self) -> Result<MigrationSettings> {
        if !self.path.exists() {
            tracing::debug!("Settings file {:?} not found, using defaults", self.path);
            return Ok(MigrationSettings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(MigrationSettings::default());
        }

        MigrationSettings::from_toml_str(&content)
    }

    /// Saves settings atomically.
    pub fn save(&self, settings: &MigrationSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = settings.to_toml_string()?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| DocmigError::config(format!("Invalid settings path: {:?}", self.path)))?;

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        Ok(self.path.with_file_name(tmp_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path().join("docmig.toml"));

        assert_eq!(storage.load().unwrap(), MigrationSettings::default());
    }

    #[test]
    fn test_blank_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docmig.toml");
        fs::write(&path, "\n  \n").unwrap();

        assert_eq!(SettingsStorage::new(path).load().unwrap(), MigrationSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SettingsStorage::new(temp_dir.path().join("nested").join("docmig.toml"));

        let mut settings = MigrationSettings::default().with_version_field_name("schema");
        settings
            .runtime_versions
            .insert("Order".to_string(), "1.5.0".to_string());

        storage.save(&settings).unwrap();
        assert!(!storage.path().with_file_name("docmig.toml.tmp").exists());

        assert_eq!(storage.load().unwrap(), settings);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docmig.toml");
        fs::write(&path, "runtime_versions = 3").unwrap();

        let err = SettingsStorage::new(path).load().unwrap_err();
        assert!(matches!(err, DocmigError::Serialization { .. }));
    }
}
