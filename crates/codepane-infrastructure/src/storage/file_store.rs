//! File-backed key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes are atomic: the value goes to a
//! temporary sibling file, is fsynced, and then renamed over the target.

use async_trait::async_trait;
use codepane_core::storage::KeyValueStore;
use codepane_core::{CodepaneError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Key-value store keeping one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(CodepaneError::internal(format!(
                "invalid storage key: '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.temp_path_for(key);

        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(value.as_bytes()).await?;
        // Ensure data is written to disk
        tmp_file.sync_all().await?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path).await?;
        tracing::debug!(key, bytes = value.len(), "persisted value");
        Ok(())
    }
}
