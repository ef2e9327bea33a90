use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use tracing::warn;

use super::FileService;
use crate::models::FileDetailsView;
use crate::utils::{decode_details, empty_token};

/// 令牌无法解析时页面上的提示
pub const INVALID_TOKEN_MESSAGE: &str = "This link is invalid or has been corrupted.";

#[derive(Serialize)]
struct DetailsPage {
    files: Vec<FileDetailsView>,
    has_files: bool,
    error: Option<&'static str>,
}

pub async fn handle_details(
    service: &FileService,
    request: &HttpRequest,
    token: Option<String>,
) -> ActixResult<HttpResponse> {
    let config = service.get_config(request)?;
    let renderer = service.get_renderer(request)?;

    let token = match token {
        Some(token) => token,
        None => empty_token()?,
    };

    let (status, files, error) = match decode_details(&token) {
        Ok(details) => {
            let files = details
                .iter()
                .map(|detail| FileDetailsView::new(detail, &config.upload))
                .collect();
            (StatusCode::OK, files, None)
        }
        Err(e) => {
            warn!("Rejected details token: {}", e);
            (StatusCode::BAD_REQUEST, Vec::new(), Some(INVALID_TOKEN_MESSAGE))
        }
    };

    let page = DetailsPage {
        has_files: !files.is_empty(),
        files,
        error,
    };
    let html = renderer.render("details.html", page)?;

    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html))
}
