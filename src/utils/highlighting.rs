//! 粘贴内容的语法高亮
//!
//! 使用 syntect 内置的语法与主题，输出带内联样式的 HTML，每行单独渲染。
//! diff 内容会先去掉 diff 标记再猜测语言，然后按原文高亮并标记增删行。

use once_cell::sync::Lazy;
use serde::Serialize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::errors::Result;

/// 高亮主题
pub const THEME_NAME: &str = "InspiredGitHub";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static THEME: Lazy<Theme> = Lazy::new(|| {
    ThemeSet::load_defaults()
        .themes
        .remove(THEME_NAME)
        .unwrap_or_default()
});

/// 上传页面中可选的语言，只列出常用的几种
pub const UI_LANGUAGES: &[(&str, &str)] = &[
    ("bash", "Bash / Shell"),
    ("c", "C"),
    ("c++", "C++"),
    ("diff", "Diff"),
    ("groovy", "Groovy"),
    ("haskell", "Haskell"),
    ("html", "HTML"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("json", "JSON"),
    ("makefile", "Makefile"),
    ("objective-c", "Objective-C"),
    ("php", "PHP"),
    ("python3", "Python"),
    ("ruby", "Ruby"),
    ("scala", "Scala"),
    ("sql", "SQL"),
    ("yaml", "YAML"),
];

/// diff 元信息行的前缀，猜测语言前去掉
const DIFF_PREFIXES: &[&str] = &[
    "diff --git",
    "--- ",
    "+++ ",
    "index ",
    "@@ ",
    "Author:",
    "AuthorDate:",
    "Commit:",
    "CommitDate:",
    "commit ",
];

#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn ui_languages() -> Vec<LanguageOption> {
    UI_LANGUAGES
        .iter()
        .map(|&(value, label)| LanguageOption { value, label })
        .collect()
}

/// 高亮后的一行
#[derive(Debug, Clone, Serialize)]
pub struct HighlightedLine {
    pub number: usize,
    pub html: String,
    // diff-add / diff-remove，普通行为空
    pub class: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    syntax: &'static SyntaxReference,
    diff: bool,
}

impl Highlighter {
    pub fn name(&self) -> String {
        if self.diff {
            format!("Diff ({})", self.syntax.name)
        } else {
            self.syntax.name.clone()
        }
    }

    pub fn is_diff(&self) -> bool {
        self.diff
    }

    /// 逐行生成 HTML，文本内容已转义
    pub fn highlight(&self, text: &str) -> Result<Vec<HighlightedLine>> {
        let mut lines = HighlightLines::new(self.syntax, &THEME);

        LinesWithEndings::from(text)
            .enumerate()
            .map(|(index, line)| -> Result<HighlightedLine> {
                let regions: Vec<_> = lines
                    .highlight_line(line, &SYNTAX_SET)?
                    .into_iter()
                    .map(|(style, piece)| (style, piece.trim_end_matches(['\n', '\r'])))
                    .collect();
                let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)?;
                let class = if self.diff { diff_line_class(line) } else { "" };

                Ok(HighlightedLine {
                    number: index + 1,
                    html,
                    class,
                })
            })
            .collect()
    }
}

/// 文本中是否有 `diff --git` 开头的行
pub fn looks_like_diff(text: &str) -> bool {
    text.lines().any(|line| line.starts_with("diff --git "))
}

/// 去掉 diff 元信息行和每行开头的 +/-，便于猜测实际语言
pub fn strip_diff_things(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());

    for line in text.lines() {
        if DIFF_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            continue;
        }

        let line = line
            .strip_prefix('+')
            .or_else(|| line.strip_prefix('-'))
            .unwrap_or(line);
        stripped.push_str(line);
        stripped.push('\n');
    }

    stripped
}

pub fn num_lines(text: &str) -> usize {
    text.lines().count()
}

fn diff_line_class(line: &str) -> &'static str {
    if line.starts_with('+') {
        "diff-add"
    } else if line.starts_with('-') {
        "diff-remove"
    } else {
        ""
    }
}

/// 按语言名查找语法，支持上传页面使用的名称
fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let language = language.to_ascii_lowercase();
    let token = match language.as_str() {
        "bash" | "shell" => "sh",
        "python" | "python3" => "py",
        "c++" => "cpp",
        "haskell" => "hs",
        "javascript" => "js",
        "ruby" => "rb",
        other => other,
    };
    SYNTAX_SET.find_syntax_by_token(token)
}

/// 根据首行猜测语言，猜不出时按纯文本处理
fn guess_syntax(text: &str) -> &'static SyntaxReference {
    let first_line = text.lines().next().unwrap_or_default();
    SYNTAX_SET
        .find_syntax_by_first_line(first_line)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

fn is_diff_syntax(syntax: &SyntaxReference) -> bool {
    syntax.name.eq_ignore_ascii_case("diff")
}

/// 选择高亮方式
///
/// `language` 为 `diff-<语言>` 时按 diff 处理并用指定语言高亮内容；
/// 未指定语言（或指定的语言找不到）而文本像 diff 时同样按 diff 处理。
pub fn get_highlighter(text: &str, language: Option<&str>) -> Highlighter {
    let language = language.map(str::trim).filter(|l| !l.is_empty());
    let diff_language = language.and_then(|l| l.strip_prefix("diff-"));
    let requested = match diff_language {
        Some(_) => None,
        None => language.and_then(find_syntax),
    };
    let syntax = requested.unwrap_or_else(|| guess_syntax(text));

    if diff_language.is_some()
        || is_diff_syntax(syntax)
        || (requested.is_none() && looks_like_diff(text))
    {
        let inner = diff_language
            .and_then(find_syntax)
            .unwrap_or_else(|| guess_syntax(&strip_diff_things(text)));
        return Highlighter {
            syntax: inner,
            diff: true,
        };
    }

    Highlighter {
        syntax,
        diff: false,
    }
}
