use crate::config::{AppConfig, StorageConfig};
use crate::errors::Result;
use crate::storage::{StorageBackend, create_backend};
use crate::utils::TemplateRenderer;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn StorageBackend>,
    pub renderer: TemplateRenderer,
}

/// 准备服务器启动的上下文
/// 包括存储后端和页面模板
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    match &config.storage {
        StorageConfig::File { dir } => {
            warn!("Attempting to create file storage backend in {}", dir)
        }
        StorageConfig::S3(s3) => warn!(
            "Attempting to create S3 storage backend for bucket {}",
            s3.bucket
        ),
    }

    let storage = create_backend(&config.storage).await?;
    warn!("Storage backend initialized: {}", storage.name());

    let renderer = TemplateRenderer::new(config.site.clone())?;
    debug!("Page templates loaded");

    if config.is_production() && config.site.abuse_contact == AppConfig::default().site.abuse_contact
    {
        warn!("Abuse contact is still the default value, set site.abuse_contact");
    }

    Ok(StartupContext { storage, renderer })
}
