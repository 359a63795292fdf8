//! Local filesystem `Source` backend.
//!
//! Unlike the teacher's `mmap`-based backend (which memory-maps one large
//! archive file for byte-range reads), an EPT dataset is a directory of
//! many small, distinct files addressed by relative path, so this backend
//! reads each file whole via `tokio::fs` rather than mapping anything.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde_json::Value;

use crate::error::{EptError, EptResult};

/// Fetches dataset files from a local directory root.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    async fn fetch(&self, path: &str) -> EptResult<Bytes> {
        let full = self.full_path(path);
        log::debug!("read {}", full.display());
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(EptError::from)
            .map_err(|e| e.into_fetch_failed(full.display().to_string()))?;
        Ok(Bytes::from(bytes))
    }

    pub async fn get_json(&self, path: &str) -> EptResult<Value> {
        let bytes = self.fetch(path).await?;
        serde_json::from_slice(&bytes).map_err(EptError::from)
    }

    pub async fn get_bytes(&self, path: &str) -> EptResult<Bytes> {
        self.fetch(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::File::create(dir.path().join("entwine.json"))
            .unwrap()
            .write_all(b"{\"bounds\":[0,0,0,1,1,1]}")
            .unwrap();

        let src = FsSource::new(dir.path());
        let v = src.get_json("entwine.json").await.unwrap();
        assert_eq!(v["bounds"][3], 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let src = FsSource::new(dir.path());
        let err = src.get_bytes("missing.laz").await.unwrap_err();
        assert!(matches!(err, EptError::FetchFailed { .. }));
    }
}
