use super::PersistenceAdapter;
use crate::{UndoError, UndoResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Adapter storing each key as `<base>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    base_path: PathBuf,
}

impl FileAdapter {
    /// Create a file adapter rooted at `base_path`. The directory is created
    /// on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Directory the adapter writes into.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> UndoResult<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }

    /// Validate that a key is safe for use as a filename.
    /// Rejects path separators, `..`, and control characters.
    fn validate_key(key: &str) -> UndoResult<()> {
        if key.is_empty() {
            return Err(UndoError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.contains('/') || key.contains('\\') || key.contains("..") || key.contains('\0') {
            return Err(UndoError::InvalidKey(format!(
                "key contains invalid characters: {key:?}"
            )));
        }
        if key.chars().any(|c| c.is_control()) {
            return Err(UndoError::InvalidKey(format!(
                "key contains control characters: {key:?}"
            )));
        }
        Ok(())
    }
}

impl PersistenceAdapter for FileAdapter {
    fn get(&self, key: &str) -> UndoResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically: temp file in the same directory, then rename.
    fn put(&self, key: &str, value: String) -> UndoResult<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_path)?;

        let tmp_path = self.base_path.join(format!(
            ".{}.{}.tmp",
            key,
            uuid::Uuid::new_v4().simple()
        ));

        let write_result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(value.as_bytes())?;
            file.flush()?;
            file.sync_all()?;
            drop(file);
            match fs::rename(&tmp_path, &path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    fs::remove_file(&path)?;
                    fs::rename(&tmp_path, &path)
                }
                Err(e) => Err(e),
            }
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(UndoError::Io(e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> UndoResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
