use rand::Rng;
use rand::distr::Alphanumeric;

/// 存储名随机部分的长度
pub const STORED_NAME_LENGTH: usize = 32;

/// 生成指定长度的随机字母数字串
pub fn random_name(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// 检查扩展名是否可以安全地拼进存储名
///
/// 只接受点号开头、后跟 1~16 个 ASCII 字母数字的扩展名。
pub fn is_safe_extension(ext: &str) -> bool {
    match ext.strip_prefix('.') {
        Some(rest) => {
            !rest.is_empty() && rest.len() <= 16 && rest.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_name_length_and_charset() {
        let name = random_name(STORED_NAME_LENGTH);
        assert_eq!(name.len(), STORED_NAME_LENGTH);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_names_differ() {
        assert_ne!(random_name(STORED_NAME_LENGTH), random_name(STORED_NAME_LENGTH));
    }

    #[test]
    fn test_safe_extension() {
        assert!(is_safe_extension(".pdf"));
        assert!(is_safe_extension(".tar7"));
        assert!(!is_safe_extension("pdf"));
        assert!(!is_safe_extension("."));
        assert!(!is_safe_extension(".p df"));
        assert!(!is_safe_extension(".a\\b"));
        assert!(!is_safe_extension(".abcdefghijklmnopq"));
    }
}
