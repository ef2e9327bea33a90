/*!
 * 速率限制中间件
 *
 * 此中间件用于限制上传频率，防止滥用存储空间。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::rate_limit::RateLimit;
 *
 * let limit = RateLimit::new(30, 60); // 30次/分钟
 * App::new()
 *     .service(
 *         web::resource("/upload")
 *             .wrap(limit.clone())
 *             .route(web::post().to(upload_handler))
 *     )
 * ```
 *
 * ## 限制规则
 *
 * - 使用 TCP 对端 IP 作为限制键
 * - 只有开启 `trust_proxy` 时才读取 Forwarded / X-Forwarded-For 头
 * - 同一个 RateLimit 的克隆共享计数，需在所有 worker 之外创建
 * - 超过限制返回 429 Too Many Requests，响应体与上传接口格式一致
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::models::UploadResponse;

/// 超过限制时返回给客户端的信息
pub const RATE_LIMIT_MESSAGE: &str = "Too many uploads, please try again later.";

/// 速率限制配置
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 是否信任反向代理提供的客户端地址
    trust_proxy: bool,
    /// 请求计数，键为客户端 IP
    counters: Cache<String, u32>,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            trust_proxy: false,
            counters: Cache::builder()
                .time_to_live(Duration::from_secs(window_secs))
                .max_capacity(100_000)
                .build(),
        }
    }

    /// 服务部署在反向代理之后时，按代理转发的客户端地址计数
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

impl From<&RateLimitConfig> for RateLimit {
    fn from(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window_secs).with_trust_proxy(config.trust_proxy)
    }
}

/// 从请求中提取客户端 IP
///
/// 安全注意事项：
/// - 转发头可以被客户端任意伪造，默认只使用 TCP 对端地址
/// - 开启 `trust_proxy` 时，反向代理必须覆盖（而不是追加）客户端传入的转发头
fn extract_client_ip(req: &ServiceRequest, trust_proxy: bool) -> String {
    if trust_proxy
        && let Some(ip) = req.connection_info().realip_remote_addr().and_then(parse_ip)
    {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 解析 IP 地址，允许带端口
fn parse_ip(value: &str) -> Option<IpAddr> {
    let value = value.trim();
    value
        .parse::<IpAddr>()
        .ok()
        .or_else(|| value.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(UploadResponse::error(RATE_LIMIT_MESSAGE))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let cache_key = format!("ip:{}", extract_client_ip(&req, limit.trust_proxy));

            // 获取当前计数
            let current_count = limit.counters.get(&cache_key).await.unwrap_or(0);

            // 检查是否超过限制
            if current_count >= limit.max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, current_count, limit.max_requests
                );
                return Ok(req.into_response(
                    create_rate_limit_response(limit.window_secs).map_into_right_body(),
                ));
            }

            // 增加计数
            limit.counters.insert(cache_key, current_count + 1).await;

            // 继续处理请求
            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;
    use actix_web::{App, web};

    #[test]
    fn test_from_config() {
        let limit = RateLimit::from(&RateLimitConfig {
            max_requests: 5,
            window_secs: 30,
            trust_proxy: true,
        });
        assert_eq!(limit.max_requests, 5);
        assert_eq!(limit.window_secs, 30);
        assert!(limit.trust_proxy);
    }

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("127.0.0.1"), Some(IpAddr::from([127, 0, 0, 1])));
        assert_eq!(parse_ip(" 10.0.0.1:4000 "), Some(IpAddr::from([10, 0, 0, 1])));
        assert!(parse_ip("::1").is_some());
        assert!(parse_ip("not-an-ip").is_none());
    }

    #[actix_web::test]
    async fn test_rejects_after_limit() {
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(RateLimit::new(2, 60))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        for _ in 0..2 {
            let req = actix_test::TestRequest::post().uri("/limited").to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = actix_test::TestRequest::post().uri("/limited").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "60");

        let body: UploadResponse = actix_test::read_body_json(resp).await;
        assert_eq!(body, UploadResponse::error(RATE_LIMIT_MESSAGE));
    }

    #[actix_web::test]
    async fn test_clients_are_counted_separately() {
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(RateLimit::new(1, 60))
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        for peer in ["10.0.0.1:4000", "10.0.0.2:4000"] {
            let req = actix_test::TestRequest::post()
                .uri("/limited")
                .peer_addr(peer.parse().unwrap())
                .to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = actix_test::TestRequest::post()
            .uri("/limited")
            .peer_addr("10.0.0.1:4000".parse().unwrap())
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    async fn statuses_with_forwarded_for(limit: RateLimit) -> Vec<StatusCode> {
        let app = actix_test::init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(limit)
                    .route(web::post().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let mut statuses = Vec::new();
        for i in 0..3 {
            let req = actix_test::TestRequest::post()
                .uri("/limited")
                .peer_addr("10.0.0.1:4000".parse().unwrap())
                .insert_header(("X-Forwarded-For", format!("1.2.3.{i}")))
                .to_request();
            statuses.push(actix_test::call_service(&app, req).await.status());
        }
        statuses
    }

    #[actix_web::test]
    async fn test_forwarded_for_is_ignored_by_default() {
        let statuses = statuses_with_forwarded_for(RateLimit::new(1, 60)).await;
        assert_eq!(
            statuses,
            [
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[actix_web::test]
    async fn test_forwarded_for_is_used_behind_trusted_proxy() {
        let statuses =
            statuses_with_forwarded_for(RateLimit::new(1, 60).with_trust_proxy(true)).await;
        assert_eq!(statuses, [StatusCode::OK; 3]);
    }
}
