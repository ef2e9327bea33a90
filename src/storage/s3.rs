//! S3 兼容对象存储后端
//!
//! 支持 AWS S3、Backblaze B2、MinIO 等 S3 兼容服务，凭据直接来自配置文件。

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use super::{BackendError, StorageBackend, StoreError};
use crate::config::S3Config;
use crate::errors::FluffyError;
use crate::models::StoredFile;

/// 并发 S3 请求上限
const DEFAULT_CONCURRENT_REQUESTS: usize = 100;

#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    rate_limiter: Arc<Semaphore>,
}

impl S3Backend {
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.key_id,
            &config.key_secret,
            None,
            None,
            "fluffy-config",
        );
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            // 1 次初始请求 + 3 次指数退避重试
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // S3 兼容服务普遍只支持 path-style
            .force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let prefix = config
            .prefix
            .as_deref()
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty());

        Self {
            client: Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
            prefix,
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        }
    }

    /// 根据存储名生成完整的对象键
    fn object_key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{name}"),
            None => name.to_string(),
        }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        "s3"
    }

    async fn store(&self, file: &StoredFile) -> Result<(), StoreError> {
        let key = self.object_key(&file.name);
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| FluffyError::network(format!("S3 rate limiter closed: {e}")))?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_length(file.size() as i64)
            .body(ByteStream::from(file.data.clone()));
        if let Some(content_type) = &file.content_type {
            request = request.content_type(content_type);
        }

        let start = std::time::Instant::now();
        request.send().await.map_err(|e| {
            error!(
                bucket = %self.bucket,
                key = %key,
                size_bytes = file.size(),
                "S3 upload failed: {}",
                DisplayErrorContext(&e)
            );
            BackendError::new(
                "Unable to upload file to storage.",
                DisplayErrorContext(&e).to_string(),
            )
        })?;

        debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = file.size(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefix: Option<&str>) -> S3Config {
        S3Config {
            bucket: "uploads".into(),
            prefix: prefix.map(String::from),
            region: "us-west-004".into(),
            endpoint: Some("http://127.0.0.1:9000".into()),
            key_id: "id".into(),
            key_secret: "secret".into(),
        }
    }

    #[actix_web::test]
    async fn test_object_key_without_prefix() {
        let backend = S3Backend::new(&config(None));
        assert_eq!(backend.object_key("ab12cd.pdf"), "ab12cd.pdf");
    }

    #[actix_web::test]
    async fn test_object_key_with_prefix() {
        let backend = S3Backend::new(&config(Some("/fluffy/objects/")));
        assert_eq!(backend.object_key("ab12cd.pdf"), "fluffy/objects/ab12cd.pdf");
    }

    #[actix_web::test]
    async fn test_blank_prefix_is_ignored() {
        let backend = S3Backend::new(&config(Some("/")));
        assert_eq!(backend.object_key("ab12cd.pdf"), "ab12cd.pdf");
    }
}
