use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error};

use super::{BackendError, StorageBackend, StoreError};
use crate::models::StoredFile;

/// 本地文件系统存储后端，文件直接写入 `dir/<存储名>`
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn store(&self, file: &StoredFile) -> Result<(), StoreError> {
        // 存储名由服务端生成，不应包含路径分隔符
        if file.name.is_empty() || file.name.contains(['/', '\\']) || file.name.starts_with('.') {
            return Err(StoreError::Backend(BackendError::new(
                "Invalid file name.",
                format!("refusing to store {:?}", file.name),
            )));
        }

        if let Err(e) = fs::create_dir_all(&self.dir).await {
            error!("Failed to create upload directory {}: {}", self.dir.display(), e);
            return Err(BackendError::new(
                "Unable to store file.",
                format!("create_dir_all {}: {e}", self.dir.display()),
            )
            .into());
        }

        let path = self.dir.join(&file.name);
        fs::write(&path, &file.data).await.map_err(|e| {
            error!("Failed to write {}: {}", path.display(), e);
            BackendError::new(
                "Unable to store file.",
                format!("write {}: {e}", path.display()),
            )
        })?;

        debug!("Stored {} ({} bytes) at {}", file.name, file.size(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Bytes;

    #[actix_web::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested"));
        let file = StoredFile::new("hello.txt", None, Bytes::from_static(b"hello"));

        backend.store(&file).await.unwrap();

        let written = std::fs::read(dir.path().join("nested").join(&file.name)).unwrap();
        assert_eq!(written, b"hello");
    }

    #[actix_web::test]
    async fn test_store_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        let mut file = StoredFile::new("hello.txt", None, Bytes::from_static(b"hello"));
        file.name = "../escape.txt".to_string();

        let err = backend.store(&file).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[actix_web::test]
    async fn test_unwritable_directory_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        // 用普通文件占住目录位置
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let backend = FileBackend::new(&blocker);
        let file = StoredFile::new("hello.txt", None, Bytes::from_static(b"hello"));

        match backend.store(&file).await {
            Err(StoreError::Backend(e)) => assert_eq!(e.display_message, "Unable to store file."),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
