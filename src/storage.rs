use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::fs;

/// Persistence for uploaded file bytes, decoupled from the record store.
/// `put` returns the server-side path the caller stores alongside the
/// record; `remove` takes that stored path back.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<String>;
    async fn remove(&self, filepath: &str) -> anyhow::Result<()>;
}

/// Stores blobs under a single base directory, keyed by the client-supplied
/// filename. Placement is the only sanitization applied to the name.
#[derive(Clone)]
pub struct LocalBlobStore {
    base: PathBuf,
}

impl LocalBlobStore {
    pub async fn new(base: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base = base.into();
        fs::create_dir_all(&base)
            .await
            .with_context(|| format!("create upload directory {}", base.display()))?;
        Ok(Self { base })
    }

    /// Reject names that would escape the base directory.
    fn resolve(&self, filename: &str) -> anyhow::Result<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            anyhow::bail!("invalid blob name: {filename:?}");
        }
        Ok(self.base.join(filename))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, filename: &str, body: Bytes) -> anyhow::Result<String> {
        let path = self.resolve(filename)?;
        fs::write(&path, &body)
            .await
            .with_context(|| format!("write blob {}", path.display()))?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, filepath: &str) -> anyhow::Result<()> {
        // Errors on a missing path as well; callers rely on that to abort
        // before touching the record.
        fs::remove_file(filepath)
            .await
            .with_context(|| format!("remove blob {filepath}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalBlobStore::new(dir.path()).await.expect("store");
        (dir, store)
    }

    #[tokio::test]
    async fn put_writes_under_base_and_returns_path() {
        let (dir, store) = store().await;
        let path = store
            .put("report.pdf", Bytes::from_static(b"%PDF-1.4"))
            .await
            .expect("put");
        assert!(path.starts_with(&dir.path().to_string_lossy().into_owned()));
        let on_disk = std::fs::read(&path).expect("blob readable");
        assert_eq!(on_disk, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn put_rejects_traversal_names() {
        let (_dir, store) = store().await;
        for name in ["../evil.pdf", "/etc/passwd", "a/../../b.pdf", ""] {
            assert!(store.put(name, Bytes::from_static(b"x")).await.is_err());
        }
    }

    #[tokio::test]
    async fn remove_deletes_the_blob() {
        let (_dir, store) = store().await;
        let path = store
            .put("gone.pdf", Bytes::from_static(b"x"))
            .await
            .expect("put");
        store.remove(&path).await.expect("remove");
        assert!(!std::path::Path::new(&path).exists());
    }

    #[tokio::test]
    async fn remove_of_missing_blob_errors() {
        let (dir, store) = store().await;
        let missing = dir.path().join("never-written.pdf");
        assert!(store.remove(&missing.to_string_lossy()).await.is_err());
    }

    #[tokio::test]
    async fn put_overwrites_existing_blob() {
        let (_dir, store) = store().await;
        store
            .put("same.pdf", Bytes::from_static(b"one"))
            .await
            .expect("first put");
        let path = store
            .put("same.pdf", Bytes::from_static(b"two"))
            .await
            .expect("second put");
        assert_eq!(std::fs::read(&path).expect("read"), b"two");
    }
}
