use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors raised while reading or writing the directory file.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("could not access directory file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed directory file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Phone number to display name mapping, persisted as a flat JSON object.
///
/// Lookups go by phone number while [`Directory::remove_name`] goes by name.
/// The file is rewritten wholesale on save with no locking, so the last
/// writer wins when several processes share it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    entries: BTreeMap<String, String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the whole mapping from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory: Directory =
            serde_json::from_slice(&raw).map_err(|source| DirectoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), entries = directory.len(), "Loaded directory");
        Ok(directory)
    }

    /// Overwrite `path` with the whole mapping. Not atomic.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DirectoryError> {
        let path = path.as_ref();
        let raw = serde_json::to_vec_pretty(self).map_err(|source| DirectoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), entries = self.len(), "Saved directory");
        Ok(())
    }

    pub fn lookup(&self, phone: &str) -> Option<&str> {
        self.entries.get(phone).map(String::as_str)
    }

    /// Insert or overwrite `phone -> name`, returning the previous name.
    pub fn insert(&mut self, phone: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.entries.insert(phone.into(), name.into())
    }

    /// Remove every entry whose name equals `name` and return the removed phone numbers.
    pub fn remove_name(&mut self, name: &str) -> Vec<String> {
        let phones: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, n)| n.as_str() == name)
            .map(|(phone, _)| phone.clone())
            .collect();
        for phone in &phones {
            self.entries.remove(phone);
        }
        phones
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }
}

impl<P: Into<String>, N: Into<String>> FromIterator<(P, N)> for Directory {
    fn from_iter<I: IntoIterator<Item = (P, N)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(p, n)| (p.into(), n.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    /// The file lives as long as the returned `TempDir`.
    fn scratch_file(contents: Option<&str>) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.json");
        if let Some(contents) = contents {
            fs::write(&path, contents).unwrap();
        }
        (dir, path)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, path) = scratch_file(None);
        let directory: Directory = [
            ("+15551230001", "Alice"),
            ("+15551230002", "Bob"),
            ("+447700900123", "Zoë"),
        ]
        .into_iter()
        .collect();

        directory.save(&path).unwrap();
        let loaded = Directory::load(&path).unwrap();
        assert_eq!(loaded, directory);
    }

    #[test]
    fn load_reads_flat_json_object() {
        let (_dir, path) = scratch_file(Some(r#"{"+15551230001": "Alice"}"#));
        let directory = Directory::load(&path).unwrap();
        assert_eq!(directory.lookup("+15551230001"), Some("Alice"));
        assert_eq!(directory.lookup("+19998887777"), None);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let (_dir, path) = scratch_file(None);
        let err = Directory::load(&path).unwrap_err();
        assert!(matches!(err, DirectoryError::Io { .. }));
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let (_dir, path) = scratch_file(Some(r#"["not", "a", "map"]"#));
        let err = Directory::load(&path).unwrap_err();
        assert!(matches!(err, DirectoryError::Parse { .. }));
    }

    #[test]
    fn insert_overwrites_existing_phone() {
        let mut directory = Directory::new();
        assert_eq!(directory.insert("+15551230001", "Alice"), None);
        assert_eq!(
            directory.insert("+15551230001", "Alicia"),
            Some("Alice".to_string())
        );
        assert_eq!(directory.lookup("+15551230001"), Some("Alicia"));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn remove_name_scans_values() {
        let mut directory: Directory = [
            ("+15551230001", "Alice"),
            ("+15551230002", "Alice"),
            ("+15551230003", "Bob"),
        ]
        .into_iter()
        .collect();

        let removed = directory.remove_name("Alice");
        assert_eq!(removed, vec!["+15551230001", "+15551230002"]);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("+15551230003"), Some("Bob"));

        // A phone number is not a name.
        assert!(directory.remove_name("+15551230003").is_empty());
        assert_eq!(directory.len(), 1);
    }
}
