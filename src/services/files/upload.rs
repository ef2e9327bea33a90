use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::web::BytesMut;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use std::fmt;
use tracing::{error, info, warn};

use super::{DETAILS_PATH, FileService};
use crate::errors::FluffyError;
use crate::models::{FileDetail, StoredFile, UploadResponse};
use crate::storage::{BackendError, StorageBackend, StoreError};
use crate::utils::encode_details;

/// 上传文件所在的表单字段名
pub const FILE_FIELD: &str = "file";

/// 内部错误统一展示的信息
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// 单个文件超过大小限制时的提示
pub const FILE_TOO_LARGE_MESSAGE: &str = "File is too large.";

/// 上传失败的原因
#[derive(Debug)]
pub enum UploadError {
    /// 存储后端已知故障，信息可展示给用户
    Backend(BackendError),
    /// 存储前的校验失败
    Rejected(String),
    /// 其他错误，只记录日志
    Unknown(FluffyError),
}

impl UploadError {
    /// 返回给客户端的错误信息，不包含任何内部细节
    pub fn user_message(&self) -> &str {
        match self {
            UploadError::Backend(e) => &e.display_message,
            UploadError::Rejected(msg) => msg,
            UploadError::Unknown(_) => UNKNOWN_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Backend(e) => write!(f, "{e}"),
            UploadError::Rejected(msg) => write!(f, "rejected: {msg}"),
            UploadError::Unknown(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<StoreError> for UploadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(e) => UploadError::Backend(e),
            StoreError::Internal(e) => UploadError::Unknown(e),
        }
    }
}

impl From<FluffyError> for UploadError {
    fn from(err: FluffyError) -> Self {
        UploadError::Unknown(err)
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        UploadError::Unknown(err.into())
    }
}

pub async fn handle_upload(
    service: &FileService,
    req: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    Ok(respond(process_upload(service, req, payload).await))
}

/// 把处理结果转换为 JSON 响应，失败时按错误类别记录日志
pub(super) fn respond(result: Result<String, UploadError>) -> HttpResponse {
    let response = match result {
        Ok(redirect) => UploadResponse::redirect(redirect),
        Err(err) => {
            match &err {
                UploadError::Backend(e) => {
                    error!("Error storing files: {}", e.detail);
                    error!("\t{}", e.display_message);
                }
                UploadError::Rejected(msg) => warn!("Upload rejected: {}", msg),
                UploadError::Unknown(e) => error!("Unknown error storing files: {}", e),
            }
            UploadResponse::error(err.user_message())
        }
    };

    HttpResponse::Ok().json(response)
}

/// 收集、存储并编码，返回详情页链接
async fn process_upload(
    service: &FileService,
    req: &HttpRequest,
    payload: Multipart,
) -> Result<String, UploadError> {
    let config = service.get_config(req)?;
    let storage = service.get_storage(req)?;

    let stored_files = collect_files(payload, config.upload.max_file_size).await?;
    let details = store_files(storage.as_ref(), &stored_files).await?;
    let token = encode_details(&details)?;

    Ok(format!("{DETAILS_PATH}/{token}"))
}

/// 读取下一个字段
///
/// 请求体中只有结束分隔符时 actix-multipart 报告 `Incomplete`，
/// 在还没有读到任何字段的情况下按空表单处理。
pub(super) async fn next_field(
    payload: &mut Multipart,
    read_any: bool,
) -> Result<Option<Field>, UploadError> {
    match payload.try_next().await {
        Ok(field) => Ok(field),
        Err(MultipartError::Incomplete) if !read_any => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// 读取字段的全部内容，超过 `limit` 字节即拒绝
pub(super) async fn read_field(field: &mut Field, limit: usize) -> Result<BytesMut, UploadError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.try_next().await? {
        // 边读边校验大小
        if data.len() + chunk.len() > limit {
            return Err(UploadError::Rejected(FILE_TOO_LARGE_MESSAGE.to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// 按顺序读取所有 `file` 文件字段
///
/// 没有 filename 的普通字段、以及浏览器在未选择文件时提交的空文件名字段都会被忽略。
pub async fn collect_files(
    mut payload: Multipart,
    max_file_size: usize,
) -> Result<Vec<StoredFile>, UploadError> {
    let mut files = Vec::new();
    let mut read_any = false;

    while let Some(mut field) = next_field(&mut payload, read_any).await? {
        read_any = true;

        let (field_name, original_name) = {
            let content_disposition = field.content_disposition();
            (
                content_disposition
                    .and_then(|cd| cd.get_name())
                    .unwrap_or_default()
                    .to_string(),
                content_disposition
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string),
            )
        };

        if field_name != FILE_FIELD {
            continue;
        }
        let Some(original_name) = original_name.filter(|name| !name.is_empty()) else {
            continue;
        };

        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = read_field(&mut field, max_file_size).await?;

        files.push(StoredFile::new(original_name, content_type, data.freeze()));
    }

    Ok(files)
}

/// 依次存储每个文件，第一个失败即中止
///
/// 已经存储成功的文件不会回滚。
pub async fn store_files(
    storage: &dyn StorageBackend,
    files: &[StoredFile],
) -> Result<Vec<FileDetail>, UploadError> {
    let start = chrono::Utc::now();
    info!("Storing {} files with {} backend...", files.len(), storage.name());

    for (index, file) in files.iter().enumerate() {
        info!("Storing {}...", file.name);
        if let Err(e) = storage.store(file).await {
            if index > 0 {
                let orphaned: Vec<&str> = files[..index].iter().map(|f| f.name.as_str()).collect();
                warn!(
                    "Upload batch aborted, {} stored file(s) left behind: {:?}",
                    index, orphaned
                );
            }
            return Err(e.into());
        }
    }

    let elapsed = chrono::Utc::now().signed_duration_since(start);
    info!(
        "Stored {} files in {:.1} seconds.",
        files.len(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    Ok(files.iter().map(FileDetail::from).collect())
}
