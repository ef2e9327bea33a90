use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, warn};

// 从 lib.rs 导入模块
use rust_fluffy_next::config::AppConfig;
use rust_fluffy_next::middlewares::RateLimit;
use rust_fluffy_next::models::AppStartTime;
use rust_fluffy_next::routes;
use rust_fluffy_next::runtime::lifetime;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // 记录程序启动时间
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    // 启动前预处理 //

    // 初始化配置
    setup_panic!();
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e.format_simple());
        std::io::Error::other(e)
    })?;

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    // 打印信息
    warn!(
        "Starting pre-startup processing...
        Project: {}
        Version: {}
        Environment: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            #[cfg(debug_assertions)]
            eprintln!("{}", e.format_colored());
            std::io::Error::other(e)
        })?;

    let storage = web::Data::new(startup.storage);
    let renderer = web::Data::new(startup.renderer);
    let app_config = web::Data::new(config.clone());
    // 所有 worker 共享同一份上传计数
    let upload_limit = RateLimit::from(&config.upload.rate_limit);

    // 输出预处理时间
    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(app_start_time.start_datetime)
            .num_milliseconds()
    );

    // 预处理完成 //

    warn!("Using {} CPU cores for the server", config.server.workers);

    let cors_max_age = config.cors.max_age;
    let keep_alive = config.server.timeouts.keep_alive;
    let max_payload_size = config.server.limits.max_payload_size;

    // Start the HTTP server
    let server = HttpServer::new(move || {
        let upload_limit = upload_limit.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(cors_max_age),
            )
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", format!("timeout={keep_alive}, max=1000")))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(app_config.clone())
            .app_data(storage.clone())
            .app_data(renderer.clone())
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(max_payload_size)) // 设置最大请求体大小
            .configure(routes::configure_page_routes) // 配置首页
            .configure(|cfg| routes::configure_file_routes(cfg, upload_limit)) // 配置上传与详情路由
    })
    .keep_alive(std::time::Duration::from_secs(keep_alive)) // 启用长连接
    .client_request_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_request,
    )) // 客户端超时
    .client_disconnect_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_disconnect,
    )) // 断连超时
    .workers(config.server.workers)
    .disable_signals(); // 由 lifetime::shutdown 统一处理信号

    let server = {
        #[cfg(unix)]
        {
            if let Some(socket_path) = config.unix_socket_path() {
                warn!("Starting server on Unix socket: {}", socket_path);
                if std::path::Path::new(socket_path).exists() {
                    std::fs::remove_file(socket_path)?;
                }
                server.bind_uds(socket_path)?
            } else {
                let bind_address = config.server_bind_address();
                warn!("Starting server at http://{}", bind_address);
                server.bind(bind_address)?
            }
        }

        #[cfg(not(unix))]
        {
            let bind_address = config.server_bind_address();
            warn!("Starting server at http://{}", bind_address);
            server.bind(bind_address)?
        }
    }
    .run();

    actix_web::rt::spawn(lifetime::shutdown::shutdown_on(
        lifetime::shutdown::listen_for_shutdown(),
        server.handle(),
    ));

    server.await?;
    warn!("Graceful shutdown: all tasks completed");

    Ok(())
}
