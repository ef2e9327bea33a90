//! 存储后端
//!
//! 后端只负责把上传文件的内容按存储名持久化。
//! 失败分两类：后端已知故障（附带可展示给用户的信息）和其他内部错误。

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::errors::{FluffyError, Result};
use crate::models::StoredFile;

pub mod file;
#[cfg(test)]
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use file::FileBackend;
#[cfg(test)]
pub use memory::MemoryBackend;
#[cfg(feature = "s3")]
pub use s3::S3Backend;

/// 后端已知故障
///
/// `display_message` 可以直接展示给用户，`detail` 只用于日志。
#[derive(Debug, Clone)]
pub struct BackendError {
    pub display_message: String,
    pub detail: String,
}

impl BackendError {
    pub fn new(display_message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            display_message: display_message.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_message, self.detail)
    }
}

impl std::error::Error for BackendError {}

/// 存储单个文件的失败原因
#[derive(Debug, Clone)]
pub enum StoreError {
    /// 后端已知故障
    Backend(BackendError),
    /// 其他内部错误，不能展示给用户
    Internal(FluffyError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(e) => write!(f, "backend failure: {e}"),
            StoreError::Internal(e) => write!(f, "internal failure: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        StoreError::Backend(err)
    }
}

impl From<FluffyError> for StoreError {
    fn from(err: FluffyError) -> Self {
        StoreError::Internal(err)
    }
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// 后端名称（仅用于日志）
    fn name(&self) -> &str;

    /// 以 `file.name` 为键保存文件内容
    async fn store(&self, file: &StoredFile) -> std::result::Result<(), StoreError>;
}

/// 根据配置创建存储后端
pub async fn create_backend(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>> {
    match config {
        StorageConfig::File { dir } => Ok(Arc::new(FileBackend::new(dir))),
        #[cfg(feature = "s3")]
        StorageConfig::S3(s3) => Ok(Arc::new(S3Backend::new(s3))),
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3(_) => Err(FluffyError::storage_plugin_not_found(
            "S3 storage requires the `s3` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display_keeps_detail() {
        let err = BackendError::new("Unable to store file.", "disk full");
        assert_eq!(err.to_string(), "Unable to store file. (disk full)");
    }

    #[test]
    fn test_store_error_conversions() {
        let backend: StoreError = BackendError::new("shown", "hidden").into();
        assert!(matches!(backend, StoreError::Backend(ref e) if e.display_message == "shown"));

        let internal: StoreError = FluffyError::network("timeout").into();
        assert!(matches!(internal, StoreError::Internal(_)));
    }

    #[actix_web::test]
    async fn test_create_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::File {
            dir: dir.path().to_string_lossy().into_owned(),
        };
        let backend = create_backend(&config).await.unwrap();
        assert_eq!(backend.name(), "file");
    }
}
