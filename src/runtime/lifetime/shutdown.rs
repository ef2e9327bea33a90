use actix_web::dev::ServerHandle;
use std::future::Future;
use tokio::signal;
use tracing::{error, warn};

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// 收到信号后优雅停止服务器，正在进行的上传会先完成
pub async fn shutdown_on<F>(signal: F, handle: ServerHandle)
where
    F: Future<Output = ()>,
{
    signal.await;
    warn!("Shutdown signal received, waiting for in-flight uploads to finish...");
    handle.stop(true).await;
}
