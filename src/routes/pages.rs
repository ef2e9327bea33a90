use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::PageService;

static PAGE_SERVICE: Lazy<PageService> = Lazy::new(PageService::new_lazy);

pub async fn handle_index(request: HttpRequest) -> ActixResult<HttpResponse> {
    PAGE_SERVICE.handle_index(&request).await
}

pub fn configure_page_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handle_index));
}
