use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::KeyValueStore;

/// [`KeyValueStore`] keeping one `<key>.json` file per key in a directory.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// failed write never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Creates a store rooted at `root`. The directory is created on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding the values.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> EngineResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(EngineError::Storage {
                message: format!("invalid storage key '{}'", key),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> EngineResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(EngineError::Storage {
                message: format!("failed to read {}: {}", path.display(), err),
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> EngineResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| EngineError::Storage {
                message: format!("failed to create {}: {}", self.root.display(), err),
            })?;
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|err| EngineError::Storage {
                message: format!("failed to write {}: {}", tmp_path.display(), err),
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|err| EngineError::Storage {
                message: format!("failed to replace {}: {}", path.display(), err),
            })?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> EngineResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(EngineError::Storage {
                message: format!("failed to remove {}: {}", path.display(), err),
            }),
        }
    }
}
