use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use serde::Serialize;

use crate::errors::FluffyError;
use crate::utils::TemplateRenderer;
use crate::utils::highlighting::{LanguageOption, ui_languages};

#[derive(Serialize)]
struct IndexPage {
    languages: Vec<LanguageOption>,
}

pub struct PageService;

impl PageService {
    pub fn new_lazy() -> Self {
        Self
    }

    // Render the upload and paste forms
    pub async fn handle_index(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let renderer = request
            .app_data::<web::Data<TemplateRenderer>>()
            .ok_or_else(|| FluffyError::app_data("TemplateRenderer not found in app data"))?;
        let html = renderer.render(
            "index.html",
            IndexPage {
                languages: ui_languages(),
            },
        )?;

        Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html))
    }
}
