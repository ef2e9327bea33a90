pub mod details;
pub mod paste;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{FluffyError, Result};
use crate::storage::StorageBackend;
use crate::utils::TemplateRenderer;

pub use upload::UploadError;

/// 详情页路径前缀
pub const DETAILS_PATH: &str = "/details";

pub struct FileService;

impl FileService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn StorageBackend>> {
        request
            .app_data::<web::Data<Arc<dyn StorageBackend>>>()
            .map(|data| data.get_ref().clone())
            .ok_or_else(|| FluffyError::app_data("Storage backend not found in app data"))
    }

    pub(crate) fn get_config<'a>(&self, request: &'a HttpRequest) -> Result<&'a AppConfig> {
        request
            .app_data::<web::Data<AppConfig>>()
            .map(|data| data.get_ref())
            .ok_or_else(|| FluffyError::app_data("AppConfig not found in app data"))
    }

    pub(crate) fn get_renderer<'a>(&self, request: &'a HttpRequest) -> Result<&'a TemplateRenderer> {
        request
            .app_data::<web::Data<TemplateRenderer>>()
            .map(|data| data.get_ref())
            .ok_or_else(|| FluffyError::app_data("TemplateRenderer not found in app data"))
    }

    // Handle file upload
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, payload).await
    }

    // Handle text paste
    pub async fn handle_paste(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        paste::handle_paste(self, request, payload).await
    }

    // Handle details page
    pub async fn handle_details(
        &self,
        request: &HttpRequest,
        token: Option<String>,
    ) -> ActixResult<HttpResponse> {
        details::handle_details(self, request, token).await
    }
}
