use actix_web::web::Bytes;
use serde::{Deserialize, Serialize};

use crate::utils::filename::{human_size, split_extension};
use crate::utils::random_name::{STORED_NAME_LENGTH, is_safe_extension, random_name};

/// 一次请求中上传的单个文件
///
/// 只在请求期间存在，交给存储后端保存一次后即丢弃。
#[derive(Debug, Clone)]
pub struct StoredFile {
    // 存储名（随机串 + 原扩展名）
    pub name: String,
    // 客户端提供的原始文件名
    pub original_name: String,
    // 客户端声明的 MIME 类型
    pub content_type: Option<String>,
    // 文件内容
    pub data: Bytes,
}

impl StoredFile {
    pub fn new(original_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        let original_name = original_name.into();
        let (_, ext) = split_extension(&original_name);
        let ext = if is_safe_extension(ext) { ext } else { "" };
        let name = format!("{}{}", random_name(STORED_NAME_LENGTH), ext);

        Self {
            name,
            original_name,
            content_type,
            data,
        }
    }

    /// 使用指定的存储名，用于需要成对保存的文件（如粘贴的原文与页面）
    pub fn named(
        name: impl Into<String>,
        original_name: impl Into<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name: name.into(),
            original_name: original_name.into(),
            content_type,
            data,
        }
    }

    /// 文件大小（字节）
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// 编码进详情链接的单个文件信息
///
/// 序列化为 `[stored_name, human_name, human_size]` 三元组以节省空间。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DetailTuple", into = "DetailTuple")]
pub struct FileDetail {
    // 存储名
    pub stored_name: String,
    // 原始文件名，扩展名已在存储名中时不重复保存
    pub human_name: String,
    // 可读的文件大小
    pub human_size: String,
}

type DetailTuple = (String, String, String);

impl From<DetailTuple> for FileDetail {
    fn from((stored_name, human_name, human_size): DetailTuple) -> Self {
        Self {
            stored_name,
            human_name,
            human_size,
        }
    }
}

impl From<FileDetail> for DetailTuple {
    fn from(detail: FileDetail) -> Self {
        (detail.stored_name, detail.human_name, detail.human_size)
    }
}

impl From<&StoredFile> for FileDetail {
    fn from(file: &StoredFile) -> Self {
        let (stem, ext) = split_extension(&file.original_name);
        let (_, stored_ext) = split_extension(&file.name);
        // 存储名丢弃了扩展名时，原扩展名只能保留在展示名中
        let human_name = if ext == stored_ext {
            stem
        } else {
            file.original_name.as_str()
        };
        Self {
            stored_name: file.name.clone(),
            human_name: human_name.to_string(),
            human_size: human_size(file.size()),
        }
    }
}
