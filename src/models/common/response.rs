use serde::{Deserialize, Serialize};

/// 上传接口统一的 JSON 响应
///
/// 成功时为 `{"success": true, "redirect": ...}`，
/// 失败时为 `{"success": false, "error": ...}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            success: true,
            redirect: Some(url.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            redirect: None,
            error: Some(message.into()),
        }
    }
}
