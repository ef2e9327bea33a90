pub mod common;
pub mod files;

pub use common::response::UploadResponse;
pub use files::entities::{FileDetail, StoredFile};
pub use files::responses::FileDetailsView;

#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
