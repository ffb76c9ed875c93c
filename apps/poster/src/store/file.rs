use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::store::{DedupStore, StoreError};

/// Directory-backed store: `<base>/<id>` holds the candidate title.
///
/// Writes go to a temp file in the same directory and are renamed into place,
/// so a crash never leaves a half-written entry behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        std::fs::create_dir_all(&base).map_err(|source| StoreError::Io {
            path: base.clone(),
            source,
        })?;
        Ok(Self { base })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.base.join(id))
    }
}

/// Ids become file names, so anything that could escape the base directory is rejected.
fn is_valid_key(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

fn write_atomically(base: &Path, path: &Path, value: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(base).map_err(io_err)?;
    tmp.write_all(value.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[async_trait]
impl DedupStore for FileStore {
    async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn insert(&self, id: &str, title: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        let base = self.base.clone();
        let value = title.to_string();
        let target = path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&base, &target, &value))
            .await
            .map_err(|e| StoreError::Worker(e.to_string()))??;

        debug!("Recorded {id} in {}", path.display());
        Ok(())
    }
}
