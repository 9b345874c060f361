//! 渲染后的短信文本清理
//!
//! 模板变量缺值或录入不规范时，渲染结果里会出现重复的章节前缀、
//! 空括号、孤立的标签和格式错误的号码，发送前统一处理。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("Invalid spaces regex"));

// "Surah Surah Al-Mulk" / "Surah: Surat Yasin" / "سورة سورة"
static CHAPTER_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:surah|surat|sura|سورة)(?:\s*:\s*|\s+)(surah|surat|sura|سورة)\b")
        .expect("Invalid chapter prefix regex")
});

// "verses Ayat 1-5"
static VERSE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:verses|verse|ayahs|ayah|ayat|aya|آيات|آية)(?:\s*:\s*|\s+)(verses|verse|ayahs|ayah|ayat|aya|آيات|آية)\b")
        .expect("Invalid verse prefix regex")
});

static REPEATED_PLUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+(?:[ \t]*\+)+").expect("Invalid plus regex"));

static SPACED_PLUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+[ \t]+(\d)").expect("Invalid spaced plus regex"));

static EMPTY_PARENS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([ \t]*\)").expect("Invalid parens regex"));

// 标签后面只剩标点，例如 "Result: ."
static EMPTY_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\p{L}[\p{L}']*:[ \t]*[.,;!?]+").expect("Invalid empty label regex")
});

// 句末之后的行尾空标签，例如 "Lesson done. Notes:"；"Dear parents:" 这类称呼保留
static TRAILING_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)([.!?;])[ \t]*\p{L}[\p{L}']*:[ \t]*$").expect("Invalid trailing label regex")
});

static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([,.;!?])").expect("Invalid punctuation regex"));

static DOTS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("Invalid dots regex"));

static COMMA_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",[ \t]*\.").expect("Invalid comma-dot regex"));

static REPEATED_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(?:[ \t]*,)+").expect("Invalid comma regex"));

// 国家区号 -> 去中继 0 的正则
static TRUNK_ZERO_RES: Lazy<Mutex<HashMap<String, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("Invalid sentence regex"));

/// 清理短信正文
pub fn clean_message(text: &str, default_country_code: &str) -> String {
    let text = normalize_whitespace(text);
    let text = dedupe_verse_prefixes(&text);
    let text = fix_phone_numbers(&text, default_country_code);
    let text = remove_empty_artifacts(&text);
    let text = remove_duplicate_text(&text);
    collapse_blank_lines(&text)
}

fn normalize_whitespace(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| SPACES_RE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn dedupe_verse_prefixes(text: &str) -> String {
    let mut current = text.to_string();
    // 三连 "Surah Surah Surah" 需要多轮
    for _ in 0..4 {
        let next = CHAPTER_PREFIX_RE.replace_all(&current, "$1").into_owned();
        let next = VERSE_PREFIX_RE.replace_all(&next, "$1").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn fix_phone_numbers(text: &str, default_country_code: &str) -> String {
    let text = REPEATED_PLUS_RE.replace_all(text, "+");
    let mut text = SPACED_PLUS_RE.replace_all(&text, "+$1").into_owned();

    let cc: String = default_country_code
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if let Some(trunk_re) = trunk_zero_regex(&cc) {
        text = trunk_re.replace_all(&text, format!("+{cc}$1")).into_owned();
    }
    text
}

fn trunk_zero_regex(cc: &str) -> Option<Regex> {
    if cc.is_empty() {
        return None;
    }
    let mut cache = TRUNK_ZERO_RES
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(cc) {
        return Some(re.clone());
    }
    let re = Regex::new(&format!(r"\+{cc}[ \t]*(?:\(0\)|0)[ \t]*(\d)")).ok()?;
    cache.insert(cc.to_string(), re.clone());
    Some(re)
}

fn remove_empty_artifacts(text: &str) -> String {
    let text = EMPTY_PARENS_RE.replace_all(text, "");
    let text = EMPTY_LABEL_RE.replace_all(&text, "");
    let text = TRAILING_LABEL_RE.replace_all(&text, "$1");
    let text = SPACE_BEFORE_PUNCT_RE.replace_all(&text, "$1");
    let text = REPEATED_COMMA_RE.replace_all(&text, ",");
    let text = COMMA_DOT_RE.replace_all(&text, ".");
    // 保留省略号
    let text = DOTS_RE.replace_all(&text, |caps: &Captures| {
        let dots = if caps[0].len() == 2 { "." } else { "..." };
        dots.to_string()
    });
    normalize_whitespace(&text)
}

fn remove_duplicate_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_key: Option<String> = None;

    for line in text.lines() {
        let line = dedupe_sentences(line);
        let key = line.trim().to_lowercase();
        if !key.is_empty() && previous_key.as_deref() == Some(key.as_str()) {
            continue;
        }
        previous_key = Some(key);
        lines.push(line);
    }
    lines.join("\n")
}

/// 去掉相邻的重复句子，不区分大小写
fn dedupe_sentences(line: &str) -> String {
    let mut segments = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(line) {
        segments.push(&line[start..m.end()]);
        start = m.end();
    }
    if start < line.len() {
        segments.push(&line[start..]);
    }

    let mut kept = String::with_capacity(line.len());
    let mut previous_key = String::new();
    for segment in segments {
        let key = sentence_key(segment);
        if !key.is_empty() && key == previous_key {
            continue;
        }
        previous_key = key;
        kept.push_str(segment);
    }
    kept.trim_end().to_string()
}

fn sentence_key(segment: &str) -> String {
    segment
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_lowercase()
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() && out.last().is_some_and(|l| l.trim().is_empty()) {
            continue;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}
