use serde::Serialize;

use crate::config::UploadConfig;
use crate::models::FileDetail;
use crate::utils::filename::{split_extension, trim_filename};

/// 详情页中展示的文件名最大字符数
pub const DISPLAY_NAME_LENGTH: usize = 17;

/// 没有扩展名时展示的占位值
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// 详情页中单个文件的完整展示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDetailsView {
    pub download_url: String,
    pub info_url: String,
    pub name: String,
    pub size: String,
    pub extension: String,
}

impl FileDetailsView {
    pub fn new(detail: &FileDetail, upload: &UploadConfig) -> Self {
        let (_, ext) = split_extension(&detail.stored_name);
        // 编码时只保存了不带扩展名的原始文件名
        let full_name = format!("{}{}", detail.human_name, ext);

        let extension = match ext.strip_prefix('.') {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => UNKNOWN_EXTENSION.to_string(),
        };

        Self {
            download_url: upload.download_url(&detail.stored_name),
            info_url: upload.info_url(&detail.stored_name),
            name: trim_filename(&full_name, DISPLAY_NAME_LENGTH),
            size: detail.human_size.clone(),
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn detail(stored: &str, human: &str, size: &str) -> FileDetail {
        FileDetail {
            stored_name: stored.into(),
            human_name: human.into(),
            human_size: size.into(),
        }
    }

    #[test]
    fn test_report_pdf() {
        let upload = AppConfig::default().upload;
        let view = FileDetailsView::new(&detail("ab12cd.pdf", "report", "2.0 MB"), &upload);

        assert_eq!(view.download_url, "/object/ab12cd.pdf");
        assert_eq!(view.info_url, "/info/ab12cd.pdf");
        assert_eq!(view.name, "report.pdf");
        assert_eq!(view.size, "2.0 MB");
        assert_eq!(view.extension, "pdf");
    }

    #[test]
    fn test_missing_extension_uses_sentinel() {
        let upload = AppConfig::default().upload;
        let view = FileDetailsView::new(&detail("ab12cd", "Makefile", "12 bytes"), &upload);

        assert_eq!(view.extension, UNKNOWN_EXTENSION);
        assert_eq!(view.name, "Makefile");
    }

    #[test]
    fn test_long_name_is_trimmed() {
        let upload = AppConfig::default().upload;
        let view = FileDetailsView::new(
            &detail("ab12cd.png", "screenshot-from-last-tuesday", "88.2 KB"),
            &upload,
        );

        assert_eq!(view.name, "screenshot....png");
        assert_eq!(view.name.chars().count(), DISPLAY_NAME_LENGTH);
    }
}
