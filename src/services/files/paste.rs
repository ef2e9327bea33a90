use actix_multipart::Multipart;
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use tracing::info;

use super::FileService;
use super::upload::{UploadError, next_field, read_field, respond, store_files};
use crate::models::StoredFile;
use crate::utils::filename::human_size;
use crate::utils::highlighting::{HighlightedLine, get_highlighter, num_lines};
use crate::utils::random_name::{STORED_NAME_LENGTH, random_name};

/// 粘贴内容所在的表单字段名
pub const TEXT_FIELD: &str = "text";

/// 可选的语言字段，为空时自动猜测
pub const LANGUAGE_FIELD: &str = "language";

pub const EMPTY_PASTE_MESSAGE: &str = "Paste is empty.";

pub const NOT_TEXT_MESSAGE: &str = "Paste must be UTF-8 text.";

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// 表单中的粘贴内容
#[derive(Debug)]
pub struct PasteInput {
    pub text: String,
    pub language: Option<String>,
}

#[derive(Serialize)]
struct PastePage {
    highlighter: String,
    is_diff: bool,
    num_lines: usize,
    size: String,
    raw_url: String,
    lines: Vec<HighlightedLine>,
}

pub async fn handle_paste(
    service: &FileService,
    req: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    Ok(respond(process_paste(service, req, payload).await))
}

/// 保存原文和高亮后的页面，返回页面链接
async fn process_paste(
    service: &FileService,
    req: &HttpRequest,
    payload: Multipart,
) -> Result<String, UploadError> {
    let config = service.get_config(req)?;
    let storage = service.get_storage(req)?;
    let renderer = service.get_renderer(req)?;

    let paste = collect_paste(payload, config.upload.max_file_size).await?;
    let highlighter = get_highlighter(&paste.text, paste.language.as_deref());
    info!(
        "Highlighting paste of {} lines as {}",
        num_lines(&paste.text),
        highlighter.name()
    );

    // 原文和页面共用同一个随机名
    let base = random_name(STORED_NAME_LENGTH);
    let raw_name = format!("{base}.txt");
    let page = PastePage {
        highlighter: highlighter.name(),
        is_diff: highlighter.is_diff(),
        num_lines: num_lines(&paste.text),
        size: human_size(paste.text.len() as u64),
        raw_url: config.upload.download_url(&raw_name),
        lines: highlighter.highlight(&paste.text)?,
    };
    let html = renderer.render("paste.html", page)?;

    let files = [
        StoredFile::named(
            raw_name,
            "paste.txt",
            Some(TEXT_CONTENT_TYPE.to_string()),
            Bytes::from(paste.text),
        ),
        StoredFile::named(
            format!("{base}.html"),
            "paste.html",
            Some(HTML_CONTENT_TYPE.to_string()),
            Bytes::from(html),
        ),
    ];
    store_files(storage.as_ref(), &files).await?;

    Ok(config.upload.download_url(&files[1].name))
}

/// 读取 `text` 和 `language` 字段，其余字段忽略
pub async fn collect_paste(
    mut payload: Multipart,
    max_size: usize,
) -> Result<PasteInput, UploadError> {
    let mut text = None;
    let mut language = None;
    let mut read_any = false;

    while let Some(mut field) = next_field(&mut payload, read_any).await? {
        read_any = true;

        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match field_name.as_str() {
            TEXT_FIELD => text = Some(read_field(&mut field, max_size).await?),
            LANGUAGE_FIELD => language = Some(read_field(&mut field, max_size).await?),
            _ => {}
        }
    }

    let text = match text {
        Some(data) => String::from_utf8(data.to_vec())
            .map_err(|_| UploadError::Rejected(NOT_TEXT_MESSAGE.to_string()))?,
        None => String::new(),
    };
    if text.trim().is_empty() {
        return Err(UploadError::Rejected(EMPTY_PASTE_MESSAGE.to_string()));
    }

    let language = language
        .map(|data| String::from_utf8_lossy(&data).trim().to_string())
        .filter(|l| !l.is_empty());

    Ok(PasteInput { text, language })
}
