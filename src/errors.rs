//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 这里的错误都属于"内部错误"，不会原样展示给上传用户。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_fluffy_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum FluffyError {
            $($variant(String),)*
        }

        impl FluffyError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(FluffyError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(FluffyError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(FluffyError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl FluffyError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        FluffyError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_fluffy_errors! {
    Configuration("E001", "Configuration Error"),
    StoragePluginNotFound("E002", "Storage Plugin Not Found"),
    FileOperation("E003", "File Operation Error"),
    Network("E004", "Network Error"),
    Serialization("E005", "Serialization Error"),
    TokenDecode("E006", "Token Decode Error"),
    Multipart("E007", "Multipart Payload Error"),
    Template("E008", "Template Error"),
    AppData("E009", "Application Data Missing"),
    Highlight("E010", "Highlight Error"),
}

impl FluffyError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for FluffyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for FluffyError {}

// 页面请求中的内部错误只返回通用 500，细节写入日志
impl actix_web::ResponseError for FluffyError {
    fn error_response(&self) -> actix_web::HttpResponse {
        tracing::error!("{}", self.format_simple());
        actix_web::HttpResponse::InternalServerError()
            .content_type("text/plain; charset=utf-8")
            .body("Internal Server Error")
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for FluffyError {
    fn from(err: std::io::Error) -> Self {
        FluffyError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for FluffyError {
    fn from(err: serde_json::Error) -> Self {
        FluffyError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for FluffyError {
    fn from(err: base64::DecodeError) -> Self {
        FluffyError::TokenDecode(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for FluffyError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        FluffyError::Multipart(err.to_string())
    }
}

impl From<upon::Error> for FluffyError {
    fn from(err: upon::Error) -> Self {
        FluffyError::Template(err.to_string())
    }
}

impl From<syntect::Error> for FluffyError {
    fn from(err: syntect::Error) -> Self {
        FluffyError::Highlight(err.to_string())
    }
}

impl From<config::ConfigError> for FluffyError {
    fn from(err: config::ConfigError) -> Self {
        FluffyError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FluffyError>;
