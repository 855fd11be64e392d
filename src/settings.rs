//! Workflow settings file (`settings.json`)
//!
//! Only the field-map directory is consumed. The file is re-read on every
//! call.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{LatticeError, Result};

/// Fixed location of the settings file, relative to the working directory
pub const SETTINGS_PATH: &str = "settings.json";

const FIELDMAP_KEY: &str = "fieldmapDir";

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(rename = "fieldmapDir")]
    fieldmap_dir: Option<String>,
}

/// Field-map directory named in `settings.json`
pub fn fieldmap_dir() -> Result<String> {
    fieldmap_dir_from(Path::new(SETTINGS_PATH))
}

/// Field-map directory named in the settings file at `path`
pub fn fieldmap_dir_from(path: &Path) -> Result<String> {
    let json = fs::read_to_string(path).map_err(|source| LatticeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = serde_json::from_str(&json).map_err(|source| LatticeError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = settings.fieldmap_dir.ok_or_else(|| LatticeError::MissingKey {
        key: FIELDMAP_KEY,
        path: path.to_path_buf(),
    })?;
    debug!("Field-map directory from {:?}: {}", path, dir);
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_settings(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_PATH);
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_fieldmap_dir() {
        let (_dir, path) = write_settings(r#"{"fieldmapDir": "/data/fieldmaps", "other": 3}"#);
        assert_eq!(fieldmap_dir_from(&path).unwrap(), "/data/fieldmaps");
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = fieldmap_dir_from(&dir.path().join(SETTINGS_PATH)).unwrap_err();
        assert!(matches!(err, LatticeError::Io { .. }));
    }

    #[test]
    fn test_missing_key_fails() {
        let (_dir, path) = write_settings(r#"{"outputDir": "figs"}"#);
        match fieldmap_dir_from(&path) {
            Err(LatticeError::MissingKey { key, .. }) => assert_eq!(key, "fieldmapDir"),
            other => panic!("Expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_fails() {
        let (_dir, path) = write_settings("{\"fieldmapDir\": ");
        let err = fieldmap_dir_from(&path).unwrap_err();
        assert!(matches!(err, LatticeError::Json { .. }));
    }

    // Single test so nothing else runs while the working directory is moved
    #[test]
    fn test_fieldmap_dir_reads_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let absent = fieldmap_dir();
        fs::write(SETTINGS_PATH, r#"{"fieldmapDir": "maps/kurri"}"#).unwrap();
        let present = fieldmap_dir();

        std::env::set_current_dir(previous).unwrap();
        assert!(matches!(absent, Err(LatticeError::Io { .. })));
        assert_eq!(present.unwrap(), "maps/kurri");
    }

    #[test]
    fn test_non_string_value_fails() {
        let (_dir, path) = write_settings(r#"{"fieldmapDir": 12}"#);
        assert!(matches!(
            fieldmap_dir_from(&path),
            Err(LatticeError::Json { .. })
        ));
    }
}
