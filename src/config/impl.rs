use config::{Config, Environment, File};

use crate::errors::Result;

use super::{
    AppConfig, AppSettings, CorsConfig, LimitConfig, RateLimitConfig, ServerConfig, SiteConfig,
    StorageConfig, TimeoutConfig, UploadConfig,
};

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                environment: "development".to_string(),
                log_level: "info".to_string(),
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                unix_socket_path: String::new(),
                workers: 0,
                max_workers: 8,
                timeouts: TimeoutConfig {
                    client_request: 60_000,
                    client_disconnect: 5_000,
                    keep_alive: 75,
                },
                limits: LimitConfig {
                    max_payload_size: 64 * 1024 * 1024,
                },
            },
            cors: CorsConfig { max_age: 3600 },
            upload: UploadConfig {
                file_url: "/object/{name}".to_string(),
                info_url: "/info/{name}".to_string(),
                max_file_size: 10 * 1024 * 1024,
                rate_limit: RateLimitConfig {
                    max_requests: 30,
                    window_secs: 60,
                    trust_proxy: false,
                },
            },
            storage: StorageConfig::File {
                dir: "./uploads".to_string(),
            },
            site: SiteConfig {
                branding: "fluffy".to_string(),
                abuse_contact: "abuse@example.com".to_string(),
                home_url: "/".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            // 内置默认值，保证没有配置文件时也能启动
            .add_source(Config::try_from(&AppConfig::default())?)
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            );

        // FLUFFY_SETTINGS 指定的配置文件必须存在
        if let Ok(settings_path) = std::env::var("FLUFFY_SETTINGS") {
            builder = builder.add_source(File::with_name(&settings_path).required(true));
        }

        // 最后加载环境变量覆盖
        builder = builder.add_source(
            Environment::with_prefix("FLUFFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 支持从环境变量加载
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?;

        let config = builder.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        Ok(app_config)
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

impl UploadConfig {
    /// 根据存储名生成下载链接
    pub fn download_url(&self, stored_name: &str) -> String {
        self.file_url.replace("{name}", stored_name)
    }

    /// 根据存储名生成信息页链接
    pub fn info_url(&self, stored_name: &str) -> String {
        self.info_url.replace("{name}", stored_name)
    }
}
