//! Header block parser / 文档头解析
//!
//! A header is a run of `<!-- key: value -->` lines between
//! `<!-- header -->` and `<!-- end-header -->`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::IngestError;

pub const HEADER_START: &str = "<!-- header -->";
pub const HEADER_END: &str = "<!-- end-header -->";

static HEADER_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- +(.*?): +(.*?) +-->").unwrap());

/// Extract all key/value pairs; last occurrence wins / 提取头部键值对
pub fn parse_header(text: &str) -> Result<HashMap<String, String>, IngestError> {
    let (start, end) = header_bounds(text)?;

    let header = HEADER_ENTRY
        .captures_iter(&text[start..end])
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    Ok(header)
}

/// Text after the end sentinel / 去掉头部后的正文
pub fn remove_header(text: &str) -> Result<&str, IngestError> {
    let (_, end) = header_bounds(text)?;
    Ok(&text[end..])
}

/// Serialize pairs back into the sentinel format, keys sorted
pub fn format_header(entries: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = entries.keys().collect();
    keys.sort();

    let mut out = String::from(HEADER_START);
    out.push('\n');
    for key in keys {
        out.push_str(&format!("<!-- {}: {} -->\n", key, entries[key]));
    }
    out.push_str(HEADER_END);
    out.push('\n');
    out
}

fn header_bounds(text: &str) -> Result<(usize, usize), IngestError> {
    let start = text
        .find(HEADER_START)
        .ok_or(IngestError::MalformedHeader("missing header section"))?;

    match text.find(HEADER_END) {
        Some(pos) if pos >= start => Ok((start, pos + HEADER_END.len())),
        _ => Err(IngestError::MalformedHeader("missing section closing tag")),
    }
}
