//! 文件名与大小的展示处理

/// 按 `splitext` 规则拆分扩展名，返回 `(主体, 扩展名)`
///
/// 扩展名包含点号，只在最后一个路径分量中查找；
/// 分量开头的点号不算扩展名（如 `.bashrc`）。
pub fn split_extension(name: &str) -> (&str, &str) {
    let bytes = name.as_bytes();
    let sep_index = name.rfind('/').map(|i| i + 1).unwrap_or(0);

    if let Some(dot_index) = name.rfind('.')
        && dot_index >= sep_index
    {
        // 跳过分量开头连续的点号
        if bytes[sep_index..dot_index].iter().any(|&b| b != b'.') {
            return (&name[..dot_index], &name[dot_index..]);
        }
    }

    (name, "")
}

/// 将文件名裁剪到 `length` 个字符以内，尽量保留扩展名
pub fn trim_filename(name: &str, length: usize) -> String {
    const ELLIPSIS: &str = "...";

    if name.chars().count() <= length {
        return name.to_string();
    }

    let (stem, ext) = split_extension(name);
    let ext_len = ext.chars().count();

    if ext_len + ELLIPSIS.len() < length {
        let keep = length - ext_len - ELLIPSIS.len();
        let prefix: String = stem.chars().take(keep).collect();
        format!("{prefix}{ELLIPSIS}{ext}")
    } else {
        // 扩展名本身过长，直接截断
        let keep = length.saturating_sub(ELLIPSIS.len());
        let prefix: String = name.chars().take(keep).collect();
        format!("{prefix}{ELLIPSIS}")
    }
}

/// 将字节数转为可读的大小，例如 `2.0 MB`
pub fn human_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if size < 1024 {
        return format!("{size} bytes");
    }

    let mut value = size as f64 / 1024.0;
    for unit in UNITS.iter().take(UNITS.len() - 1) {
        if value < 1024.0 {
            return format!("{value:.1} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1} {}", UNITS[UNITS.len() - 1])
}
