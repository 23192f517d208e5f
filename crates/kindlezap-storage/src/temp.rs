use crate::error::{StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const FILE_PREFIX: &str = "kindlezap-";
const UPLOAD_SUFFIX: &str = ".pdf";

/// Directory holding the uploads and converter output of in-flight requests.
#[derive(Clone, Debug)]
pub struct TempStorage {
    base_path: PathBuf,
}

impl TempStorage {
    /// Create a new TempStorage rooted at `base_path`, creating the directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create temp directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(TempStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Open a cleanup scope bound to this storage.
    pub fn scope(&self) -> TempFileScope {
        TempFileScope {
            storage: self.clone(),
            paths: Vec::new(),
        }
    }

    /// Fresh, unique path with the upload suffix. Nothing is created on disk.
    fn next_path(&self) -> PathBuf {
        self.base_path
            .join(format!("{}{}{}", FILE_PREFIX, Uuid::new_v4(), UPLOAD_SUFFIX))
    }

    /// Write `data` to a new uniquely named `.pdf` file and return its path.
    pub async fn store(&self, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.next_path();
        self.write_new(&path, data).await?;
        Ok(path)
    }

    async fn write_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!("Failed to create {}: {}", path.display(), e))
            })?;
        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), size = data.len(), "Stored upload");
        Ok(())
    }

    /// Delete `path` if it exists. Deleting a missing file is not an error.
    pub async fn remove(&self, path: &Path) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed temporary file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Guaranteed-release set of temporary files owned by one request.
///
/// Paths are registered before anything is written to them, so partially written
/// uploads and half-finished converter output are covered too.
#[derive(Debug)]
pub struct TempFileScope {
    storage: TempStorage,
    paths: Vec<PathBuf>,
}

impl TempFileScope {
    /// Store an upload and register it with this scope.
    pub async fn store(&mut self, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.storage.next_path();
        self.track(path.clone());
        self.storage.write_new(&path, data).await?;
        Ok(path)
    }

    /// Register a path (typically converter output) for removal.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Remove every registered file. Failures are logged, never returned.
    pub async fn release(mut self) {
        let paths = std::mem::take(&mut self.paths);
        for path in &paths {
            if let Err(e) = self.storage.remove(path).await {
                tracing::warn!(error = %e, "Failed to remove temporary file");
            }
        }
        tracing::debug!(count = paths.len(), "Temporary files released");
    }
}

impl Drop for TempFileScope {
    fn drop(&mut self) {
        // Only reached with paths left when `release` never ran (panic or cancelled request).
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed temporary file on drop")
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file on drop")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, TempStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = TempStorage::new(dir.path()).await.expect("storage");
        (dir, storage)
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).expect("read_dir").count()
    }

    #[tokio::test]
    async fn store_writes_unique_pdf_files() {
        let (dir, storage) = storage().await;
        let a = storage.store(b"%PDF-1.4 a").await.expect("store a");
        let b = storage.store(b"%PDF-1.4 b").await.expect("store b");

        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(std::fs::read(&a).expect("read"), b"%PDF-1.4 a");
        assert_eq!(entries(dir.path()), 2);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (dir, storage) = storage().await;
        let path = storage.store(b"data").await.expect("store");

        storage.remove(&path).await.expect("first remove");
        storage.remove(&path).await.expect("second remove");
        storage
            .remove(&dir.path().join("never-existed.pdf"))
            .await
            .expect("missing file");
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn store_into_missing_directory_fails() {
        let (dir, storage) = storage().await;
        std::fs::remove_dir(dir.path()).expect("remove dir");
        let err = storage.store(b"data").await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
    }

    #[tokio::test]
    async fn release_removes_tracked_and_derived_files() {
        let (dir, storage) = storage().await;
        let mut scope = storage.scope();
        let pdf = scope.store(b"%PDF").await.expect("store");
        let epub = pdf.with_extension("epub");
        std::fs::write(&epub, b"epub").expect("write epub");
        scope.track(epub.clone());
        // Output that was registered but never produced
        scope.track(pdf.with_extension("html"));

        scope.release().await;
        assert!(!pdf.exists());
        assert!(!epub.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn dropping_scope_removes_files() {
        let (dir, storage) = storage().await;
        {
            let mut scope = storage.scope();
            scope.store(b"%PDF").await.expect("store");
            assert_eq!(entries(dir.path()), 1);
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn tracking_same_path_twice_is_harmless() {
        let (dir, storage) = storage().await;
        let mut scope = storage.scope();
        let pdf = scope.store(b"%PDF").await.expect("store");
        scope.track(pdf.clone());
        assert_eq!(scope.paths.len(), 1);
        scope.release().await;
        assert_eq!(entries(dir.path()), 0);
    }
}
