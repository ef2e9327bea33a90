use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::RateLimit;
use crate::services::FileService;
use crate::services::files::DETAILS_PATH;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_upload(&request, payload).await
}

pub async fn handle_paste(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_paste(&request, payload).await
}

pub async fn handle_details(
    request: HttpRequest,
    token: web::Path<String>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .handle_details(&request, Some(token.into_inner()))
        .await
}

pub async fn handle_details_default(request: HttpRequest) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_details(&request, None).await
}

// 配置路由
// 限流器需要在 worker 之外创建后传入，保证所有 worker 共享计数
// 上传和粘贴共用同一份计数
pub fn configure_file_routes(cfg: &mut web::ServiceConfig, upload_limit: RateLimit) {
    cfg.service(
        web::resource("/upload")
            .wrap(upload_limit.clone())
            .route(web::post().to(handle_upload)),
    )
    .service(
        web::resource("/paste")
            .wrap(upload_limit)
            .route(web::post().to(handle_paste)),
    )
    .route(DETAILS_PATH, web::get().to(handle_details_default))
    .route(
        &format!("{DETAILS_PATH}/{{enc}}"),
        web::get().to(handle_details),
    );
}
