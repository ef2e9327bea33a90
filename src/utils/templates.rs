//! 页面模板渲染
//!
//! 使用 rust-embed 在编译时嵌入 `templates/` 目录，启动时交给 upon 编译。
//! 所有页面都会得到站点信息（品牌名、滥用举报邮箱、首页链接、版本号）。

use rust_embed::Embed;
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;
use upon::{Engine, Value, fmt as upon_fmt};

use crate::config::SiteConfig;
use crate::errors::{FluffyError, Result};

/// 嵌入页面模板
#[derive(Embed)]
#[folder = "templates/"]
struct PageTemplates;

/// 渲染页面时的公共上下文
#[derive(Serialize)]
struct PageContext<'a, T: Serialize> {
    site: &'a SiteConfig,
    version: &'static str,
    #[serde(flatten)]
    page: T,
}

/// 默认格式化器：字符串做 HTML 转义，其余类型沿用 upon 的默认行为
fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) => {
            for c in s.chars() {
                match c {
                    '&' => f.write_str("&amp;")?,
                    '<' => f.write_str("&lt;")?,
                    '>' => f.write_str("&gt;")?,
                    '"' => f.write_str("&quot;")?,
                    '\'' => f.write_str("&#x27;")?,
                    c => f.write_char(c)?,
                }
            }
        }
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}

/// `raw` 格式化器：输出已经转义过的 HTML 片段
fn raw_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) => f.write_str(s)?,
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}

pub struct TemplateRenderer {
    engine: Engine<'static>,
    site: SiteConfig,
}

impl TemplateRenderer {
    /// 编译所有嵌入的模板
    pub fn new(site: SiteConfig) -> Result<Self> {
        let mut engine = Engine::new();
        engine.set_default_formatter(&escape_formatter);
        engine.add_formatter("raw", raw_formatter);

        for name in PageTemplates::iter() {
            let Some(file) = PageTemplates::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|e| FluffyError::template(format!("{name} is not UTF-8: {e}")))?;
            engine.add_template(name.to_string(), source)?;
            debug!("Compiled template {}", name);
        }

        Ok(Self { engine, site })
    }

    /// 渲染指定模板
    pub fn render<T: Serialize>(&self, name: &str, page: T) -> Result<String> {
        let template = self
            .engine
            .get_template(name)
            .ok_or_else(|| FluffyError::template(format!("Template {name} not found")))?;

        let ctx = PageContext {
            site: &self.site,
            version: env!("CARGO_PKG_VERSION"),
            page,
        };
        Ok(template.render(ctx).to_string()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(AppConfig::default().site).unwrap()
    }

    #[derive(Serialize)]
    struct Empty {}

    #[test]
    fn test_index_contains_branding() {
        #[derive(Serialize)]
        struct Index {
            languages: Vec<crate::utils::highlighting::LanguageOption>,
        }

        let html = renderer()
            .render("index.html", Index { languages: Vec::new() })
            .unwrap();
        assert!(html.contains("fluffy"));
        assert!(html.contains("abuse@example.com"));
        assert!(html.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_unknown_template() {
        let err = renderer().render("missing.html", Empty {}).unwrap_err();
        assert_eq!(err.code(), "E008");
    }

    #[test]
    fn test_values_are_escaped() {
        #[derive(Serialize)]
        struct Page {
            files: Vec<crate::models::FileDetailsView>,
            has_files: bool,
            error: Option<String>,
        }

        let html = renderer()
            .render(
                "details.html",
                Page {
                    files: vec![crate::models::FileDetailsView {
                        download_url: "/object/x.html".into(),
                        info_url: "/info/x.html".into(),
                        name: "<script>.html".into(),
                        size: "1 bytes".into(),
                        extension: "html".into(),
                    }],
                    has_files: true,
                    error: None,
                },
            )
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_raw_formatter_keeps_markup() {
        let mut engine = Engine::new();
        engine.set_default_formatter(&escape_formatter);
        engine.add_formatter("raw", raw_formatter);
        engine
            .add_template("t", "{{ html | raw }} {{ html }}")
            .unwrap();

        let out = engine
            .template("t")
            .render(upon::value! { html: "<b>x</b>" })
            .to_string()
            .unwrap();
        assert_eq!(out, "<b>x</b> &lt;b&gt;x&lt;/b&gt;");
    }
}
