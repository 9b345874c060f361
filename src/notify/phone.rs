//! 电话号码规范化
//!
//! 数据库中的号码来自人工录入，格式五花八门：带空格、括号、`tel:` 前缀，
//! 一个字段里填多个号码，甚至同一个号码连写两遍。这里统一转换为 `+<digits>`。

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

/// 规范化为 `+<国家区号><号码>`，无法识别时返回 `None`
///
/// `default_country_code` 不带 `+`，例如 `"44"`。
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let country_code: String = default_country_code
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    // 一个字段可能包含多个号码，取第一个有效的
    raw.trim()
        .split([',', ';', '/', '|', '\n', '\r'])
        .find_map(|segment| normalize_segment(segment, &country_code))
}

pub fn is_valid_phone(raw: &str, default_country_code: &str) -> bool {
    normalize_phone(raw, default_country_code).is_some()
}

fn normalize_segment(segment: &str, country_code: &str) -> Option<String> {
    let mut segment = segment.trim();
    if let Some(prefix) = segment.get(..4)
        && prefix.eq_ignore_ascii_case("tel:")
    {
        segment = segment[4..].trim();
    }

    let first_digit = segment.find(|c: char| c.is_ascii_digit())?;
    let international = segment[..first_digit].contains('+');

    let digits: String = segment.chars().filter(char::is_ascii_digit).collect();
    let digits = collapse_doubled(digits);

    let normalized = if international {
        strip_trunk_zero(digits, country_code)
    } else if let Some(rest) = digits.strip_prefix("00") {
        strip_trunk_zero(rest.to_string(), country_code)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{country_code}{rest}")
    } else if !country_code.is_empty()
        && digits.starts_with(country_code)
        && digits.len() >= country_code.len() + MIN_DIGITS
    {
        strip_trunk_zero(digits, country_code)
    } else {
        format!("{country_code}{digits}")
    };

    (MIN_DIGITS..=MAX_DIGITS)
        .contains(&normalized.len())
        .then(|| format!("+{normalized}"))
}

/// `+44 (0)7700...` 中国家区号后的 0 是国内长途前缀
fn strip_trunk_zero(digits: String, country_code: &str) -> String {
    if country_code.is_empty() {
        return digits;
    }
    match digits.strip_prefix(country_code) {
        Some(rest) if rest.starts_with('0') => format!("{country_code}{}", &rest[1..]),
        _ => digits,
    }
}

/// 同一号码无分隔符连写两遍时只保留一份
fn collapse_doubled(digits: String) -> String {
    let len = digits.len();
    if len % 2 == 0 && len / 2 >= MIN_DIGITS {
        let (first, second) = digits.split_at(len / 2);
        if first == second {
            return first.to_string();
        }
    }
    digits
}
