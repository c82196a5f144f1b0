//! Headerless outline parser / 无头部大纲解析
//!
//! Older lesson files carry no header block. Their metadata lives in the
//! headings themselves: `#Group@n`, `##Title@n` and `###Subtitle` lines.
//!
//! Uploads always go through the header-block loader, which rejects
//! headerless files. [`Outline::to_document`] converts an outline into a
//! file the loader accepts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::header::format_header;

use crate::models::TopicKind;

static GROUP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([^#].*?)(?:@(\d+))?\s*$").unwrap());

static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##([^#].*?)(?:@(\d+))?\s*$").unwrap());

static SUBTITLE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###(.*)$").unwrap());

pub const SUBTITLE_SEPARATOR: &str = " \u{2022} ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineHeader {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: TopicKind,
    pub group_title: Option<String>,
    pub group_index: Option<i64>,
    pub title: Option<String>,
    pub title_index: Option<i64>,
    pub subtitles: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub header: OutlineHeader,
    /// Body from the `##` line on, its `@n` suffix dropped
    pub lines: Vec<String>,
}

impl Outline {
    /// Header block built from the outline, followed by the body lines
    pub fn to_document(&self) -> String {
        let mut entries = HashMap::new();
        if let Some(title) = &self.header.title {
            entries.insert("title".to_string(), title.clone());
        }
        if !self.header.subtitles.is_empty() {
            entries.insert("subtitle".to_string(), self.header.subtitles.clone());
        }
        if let Some(index) = self.header.title_index {
            entries.insert("sort-index".to_string(), index.to_string());
        }
        format!("{}{}", format_header(&entries), self.lines.join("\n"))
    }
}

/// Parse a headerless outline document / 解析大纲文档
pub fn parse_outline(file_name: &str, kind: TopicKind, content: &str) -> Outline {
    let mut header = OutlineHeader {
        filename: file_name.to_string(),
        kind,
        group_title: None,
        group_index: None,
        title: None,
        title_index: None,
        subtitles: String::new(),
    };
    let mut subtitles = Vec::new();
    let mut lines = Vec::new();
    let mut in_body = false;

    for line in content.split('\n') {
        if let Some(caps) = TITLE_LINE.captures(line) {
            let title = caps[1].trim().to_string();
            header.title_index = caps.get(2).and_then(|m| m.as_str().parse().ok());
            lines.push(format!("##{}", title));
            header.title = Some(title);
            in_body = true;
            continue;
        }

        if !in_body {
            if let Some(caps) = GROUP_LINE.captures(line) {
                header.group_title = Some(caps[1].trim().to_string());
                header.group_index = caps.get(2).and_then(|m| m.as_str().parse().ok());
            }
            continue;
        }

        if let Some(caps) = SUBTITLE_LINE.captures(line) {
            subtitles.push(caps[1].trim().to_string());
        }
        lines.push(line.to_string());
    }

    header.subtitles = subtitles.join(SUBTITLE_SEPARATOR);
    Outline { header, lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixture() {
        let outline = parse_outline("pub.chapter.md", TopicKind::Article, "#A@1\n##B@2\n###C\n>**x** y\n");
        assert_eq!(outline.header.group_title.as_deref(), Some("A"));
        assert_eq!(outline.header.group_index, Some(1));
        assert_eq!(outline.header.title.as_deref(), Some("B"));
        assert_eq!(outline.header.title_index, Some(2));
        assert_eq!(outline.header.subtitles, "C");
        assert_eq!(outline.lines, vec!["##B", "###C", ">**x** y", ""]);
    }

    #[test]
    fn test_parse_lesson() {
        let content = "#Indonesisch voor beginners@1\n\
            ##Les 1. Apa ini?@10\n\
            ###Woordenlijst\n\
            >**akhir** einde\n\
            **akhir-akhir ini** onlangs\n";
        let outline = parse_outline("filename.orig", TopicKind::Article, content);

        let expected = OutlineHeader {
            filename: "filename.orig".to_string(),
            kind: TopicKind::Article,
            group_title: Some("Indonesisch voor beginners".to_string()),
            group_index: Some(1),
            title: Some("Les 1. Apa ini?".to_string()),
            title_index: Some(10),
            subtitles: "Woordenlijst".to_string(),
        };
        assert_eq!(outline.header, expected);
        assert_eq!(
            outline.lines,
            vec![
                "##Les 1. Apa ini?",
                "###Woordenlijst",
                ">**akhir** einde",
                "**akhir-akhir ini** onlangs",
                "",
            ]
        );
    }

    #[test]
    fn test_to_document_is_accepted_by_loader() {
        let outline = parse_outline(
            "boek.les3.md",
            TopicKind::Article,
            "#Boek@1\n##Les Tiga@3\n###Di kantor\nKata #kantor\n",
        );
        let document = outline.to_document();
        let upload = crate::article::loader::parse_file(&document, "boek.les3.md").unwrap();
        assert_eq!(upload.topic.title.as_deref(), Some("Les Tiga"));
        assert_eq!(upload.topic.subtitle.as_deref(), Some("Di kantor"));
        assert_eq!(upload.topic.sort_index, 3);
        assert_eq!(upload.article.hash_tags.len(), 1);
    }

    #[test]
    fn test_multiple_subtitles_joined() {
        let outline = parse_outline("a.b.md", TopicKind::Article, "##T\n###Een\ntekst\n###Twee");
        assert_eq!(outline.header.subtitles, "Een \u{2022} Twee");
        assert_eq!(outline.header.title_index, None);
    }

    #[test]
    fn test_without_title_line() {
        let outline = parse_outline("a.b.md", TopicKind::Article, "#Groep\ngeen titel\n");
        assert_eq!(outline.header.group_title.as_deref(), Some("Groep"));
        assert!(outline.lines.is_empty());
    }
}
