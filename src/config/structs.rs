use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
    pub site: SiteConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub environment: String,
    pub log_level: String,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub max_age: usize,
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub file_url: String,       // 下载链接模板，`{name}` 为存储名
    pub info_url: String,       // 信息页链接模板，`{name}` 为存储名
    pub max_file_size: usize,   // 单文件最大字节数
    pub rate_limit: RateLimitConfig,
}

/// 上传速率限制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
    #[serde(default)]
    pub trust_proxy: bool, // 位于反向代理之后时按转发头计数
}

/// 存储后端配置，`type` 字段决定具体后端
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// 本地文件系统
    File { dir: String },
    /// S3 兼容对象存储
    S3(S3Config),
}

/// S3 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    #[serde(default)]
    pub prefix: Option<String>,
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    pub key_id: String,
    #[serde(skip_serializing, default)] // 不序列化到任何输出中
    pub key_secret: String,
}

/// 页面展示相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub branding: String,
    pub abuse_contact: String,
    pub home_url: String,
}
