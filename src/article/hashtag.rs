//! Hashtag extraction and markup / 话题标签提取
//!
//! Two syntaxes: bare `#word` (a letter, apostrophe or hyphen followed by at
//! least one more letter, digit, apostrophe or hyphen) and braced
//! `#{multi word}`. Heading lines carry the running subtitle and never
//! contribute tags, though tags written in them are still marked up.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::HashTagOccurrence;

static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([-'\p{L}][-'\p{L}\p{N}]+)|#\{(.+?)\}").unwrap());

static BARE_HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[-'\p{L}][-'\p{L}\p{N}]+").unwrap());

static BRACED_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\{(.+?)\}").unwrap());

/// A heading is `#` followed by more `#`, whitespace or nothing;
/// `#word` at line start is a tag, not a heading.
pub fn is_heading(line: &str) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('#'), None) => true,
        (Some('#'), Some(c)) => c == '#' || c.is_whitespace(),
        _ => false,
    }
}

/// Heading text without its leading `#` run / 标题文本
pub fn heading_text(line: &str) -> &str {
    line.trim_start_matches('#').trim()
}

/// Collect every tag occurrence with its nearest preceding heading / 提取标签
pub fn extract_hashtags(content: &str) -> Vec<HashTagOccurrence> {
    content
        .split('\n')
        .map(str::trim)
        .fold((String::new(), Vec::new()), |(subtitle, mut found), line| {
            if is_heading(line) {
                return (heading_text(line).to_string(), found);
            }
            for caps in HASHTAG.captures_iter(line) {
                let tag = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
                if let Some(tag) = tag {
                    found.push(HashTagOccurrence {
                        tag: tag.trim().to_lowercase(),
                        subtitle: subtitle.clone(),
                    });
                }
            }
            (subtitle, found)
        })
        .1
}

/// Wrap both tag syntaxes in a `hashtag` span everywhere in the body.
/// On heading lines the leading `#` run is kept out of the match so that
/// `###Title` stays a heading.
pub fn mark_hashtags(content: &str) -> String {
    content
        .split('\n')
        .map(|line| {
            let split = if is_heading(line.trim_start()) {
                let indent = line.len() - line.trim_start().len();
                indent + line[indent..].len() - line[indent..].trim_start_matches('#').len()
            } else {
                0
            };
            let (marker, body) = line.split_at(split);
            format!("{}{}", marker, mark_line(body))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn mark_line(text: &str) -> String {
    let text = BARE_HASHTAG.replace_all(text, r#"<span class="hashtag">$0</span>"#);
    BRACED_HASHTAG
        .replace_all(&text, r#"<span class="hashtag">#$1</span>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(tag: &str, subtitle: &str) -> HashTagOccurrence {
        HashTagOccurrence { tag: tag.to_string(), subtitle: subtitle.to_string() }
    }

    #[test]
    fn test_subtitle_carries_forward() {
        let found = extract_hashtags("###Title\n>**a** b\n#tag1 #tag2\n");
        assert_eq!(found, vec![occ("tag1", "Title"), occ("tag2", "Title")]);
    }

    #[test]
    fn test_no_dedup_across_subtitles() {
        let content = "## Eerste\nzie #rumah\n## Tweede\nook #Rumah en #{Rumah Sakit}\n";
        let found = extract_hashtags(content);
        assert_eq!(
            found,
            vec![
                occ("rumah", "Eerste"),
                occ("rumah", "Tweede"),
                occ("rumah sakit", "Tweede"),
            ]
        );
    }

    #[test]
    fn test_tags_before_any_heading_have_empty_subtitle() {
        assert_eq!(extract_hashtags("#één woord"), vec![occ("één", "")]);
    }

    #[test]
    fn test_heading_lines_contribute_nothing() {
        assert!(extract_hashtags("## Les #1 #hari\n#\n").is_empty());
    }

    #[test]
    fn test_single_letter_is_not_a_tag() {
        assert!(extract_hashtags("item #a and #5").is_empty());
    }

    #[test]
    fn test_mark_hashtags_in_headings() {
        assert_eq!(
            mark_hashtags("## Kop #hari\n###Judul"),
            "## Kop <span class=\"hashtag\">#hari</span>\n###Judul"
        );
        assert_eq!(mark_hashtags("#"), "#");
    }

    #[test]
    fn test_mark_hashtags() {
        let marked = mark_hashtags("## Kop\nlees #buku en #{rumah sakit}");
        assert_eq!(
            marked,
            "## Kop\nlees <span class=\"hashtag\">#buku</span> en <span class=\"hashtag\">#rumah sakit</span>"
        );
    }
}
