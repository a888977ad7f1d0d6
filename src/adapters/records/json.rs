//! JSON directory record source
//!
//! Each `*.json` file in the input directory holds one serialized [`Person`].

use super::RecordSource;
use crate::domain::{Person, Result, TabulaError};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// Reads one patient per JSON file from a directory
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    directory: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl RecordSource for JsonDirectorySource {
    /// File names of every `*.json` file, sorted
    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            TabulaError::Io(format!(
                "Failed to read input directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_record = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORD_EXTENSION));
            if !is_record {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                keys.push(name.to_string());
            }
        }

        keys.sort();
        tracing::debug!(
            directory = %self.directory.display(),
            count = keys.len(),
            "Listed patient records"
        );
        Ok(keys)
    }

    fn load(&self, key: &str) -> Result<Person> {
        let path = self.directory.join(key);
        let contents = fs::read_to_string(&path)
            .map_err(|e| TabulaError::Io(format!("Failed to read {}: {e}", path.display())))?;

        serde_json::from_str(&contents).map_err(|e| {
            TabulaError::Serialization(format!("Failed to parse {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PERSON: &str = r#"{
        "id": "b8f5c3a2",
        "birthdate": 315532800000,
        "attributes": {"first": "Ana", "address": "100 Main St"},
        "record": {"encounters": []}
    }"#;

    #[test]
    fn test_list_only_json_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.json"), PERSON).unwrap();
        fs::write(temp_dir.path().join("a.JSON"), PERSON).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignore").unwrap();
        fs::create_dir(temp_dir.path().join("nested.json")).unwrap();

        let source = JsonDirectorySource::new(temp_dir.path());
        assert_eq!(source.list().unwrap(), ["a.JSON", "b.json"]);
    }

    #[test]
    fn test_load_person() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("p.json"), PERSON).unwrap();

        let person = JsonDirectorySource::new(temp_dir.path())
            .load("p.json")
            .unwrap();
        assert_eq!(person.id, "b8f5c3a2");
        assert_eq!(person.attribute("first"), Some("Ana"));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{ not json").unwrap();

        let err = JsonDirectorySource::new(temp_dir.path())
            .load("bad.json")
            .unwrap_err();
        assert!(matches!(err, TabulaError::Serialization(_)));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = JsonDirectorySource::new(temp_dir.path().join("absent"));
        assert!(matches!(source.list(), Err(TabulaError::Io(_))));
    }
}
