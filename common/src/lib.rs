//! 共用工具函数库
//!
//! 这个模块包含了整个workspace中可能用到的通用工具函数。
use anyhow::Result;
use url::Url;
pub mod fetcher;
pub mod models;
pub use fetcher::*;
pub use models::*;

pub const GENERAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DESC_MAX_LENGTH: usize = 100;
pub const DESC_KEEP_LENGTH: usize = 97;

/// 获取环境变量的值
pub fn get_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 使用url库安全地拼接URL，避免斜杠重复
pub fn join_url(base: &str, path: &str) -> Result<String> {
    let base_url = Url::parse(base)?;
    let joined = base_url.join(path)?;
    Ok(joined.to_string())
}

/// 截断描述文本
///
/// 先去掉换行，字符数超过 [`DESC_MAX_LENGTH`] 时保留前 [`DESC_KEEP_LENGTH`] 个字符并追加 `...`
pub fn truncate_desc(desc: &str) -> String {
    let flat: String = desc.chars().filter(|c| *c != '\n' && *c != '\r').collect();

    if flat.chars().count() <= DESC_MAX_LENGTH {
        return flat;
    }

    let truncated: String = flat.chars().take(DESC_KEEP_LENGTH).collect();
    format!("{}...", truncated)
}

/// 千分位格式化计数，例如 1234567 -> "1,234,567"
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_var() {
        // 测试获取一个存在的环境变量
        unsafe {
            std::env::set_var("LINKBOT_COMMON_TEST_VAR", "test_value");
        }
        let value = get_env_var("LINKBOT_COMMON_TEST_VAR");
        assert_eq!(value, Some("test_value".to_string()));

        // 测试获取一个不存在的环境变量
        let missing_value = get_env_var("LINKBOT_COMMON_MISSING_VAR");
        assert_eq!(missing_value, None);
    }

    #[test]
    fn test_url_joining() {
        let test_cases = vec![
            (
                "https://www.bilibili.com/video/",
                "BV1xx411c7mD",
                "https://www.bilibili.com/video/BV1xx411c7mD",
            ),
            (
                "https://www.bilibili.com/video/",
                "av170001",
                "https://www.bilibili.com/video/av170001",
            ),
            (
                "https://api.github.com/",
                "/repos/rust-lang/rust",
                "https://api.github.com/repos/rust-lang/rust",
            ),
        ];

        for (base, path, expected) in test_cases {
            let result = join_url(base, path).unwrap();
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_truncate_desc_short() {
        assert_eq!(truncate_desc(""), "");
        assert_eq!(truncate_desc("一个简短的简介"), "一个简短的简介");

        // 恰好 100 个字符不截断
        let exact = "a".repeat(100);
        assert_eq!(truncate_desc(&exact), exact);
    }

    #[test]
    fn test_truncate_desc_long() {
        let long: String = (0..150).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let result = truncate_desc(&long);

        assert_eq!(result.chars().count(), 100);
        assert!(result.ends_with("..."));
        assert_eq!(&result[..97], &long[..97]);

        // 多字节字符按字符计数
        let wide = "哔".repeat(101);
        let result = truncate_desc(&wide);
        assert_eq!(result, format!("{}...", "哔".repeat(97)));
    }

    #[test]
    fn test_truncate_desc_strips_newlines() {
        assert_eq!(truncate_desc("第一行\n第二行\r\n第三行"), "第一行第二行第三行");
    }

    #[test]
    fn test_format_count() {
        let test_cases = vec![
            (0, "0"),
            (7, "7"),
            (999, "999"),
            (1000, "1,000"),
            (12345, "12,345"),
            (1234567, "1,234,567"),
            (100000000, "100,000,000"),
        ];

        for (count, expected) in test_cases {
            assert_eq!(format_count(count), expected);
        }
    }
}
