//! Markdown article ingestion / 文章导入
//!
//! An article file is `publication.chapter.md` with a header block. Parsing
//! yields the topic metadata plus the article record (raw text, rendered
//! HTML, plain index text and hashtag occurrences).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;

use super::hashtag::{extract_hashtags, mark_hashtags};
use super::header::parse_header;
use super::outline::SUBTITLE_SEPARATOR;
use crate::error::IngestError;
use crate::markdown;
use crate::models::{ArticleRecord, HashTagRow, Topic, TopicKind, PUBLIC_GROUP};
use crate::store::ArticleStore;
use crate::utils::split_file_name;

static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# *([^#\n][^\n]+)").unwrap());

static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##[ \t]+([^\n]*)$").unwrap());

static SECTION_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</section>").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>\n]+>").unwrap());

/// Chapter name of a publication's title page / 出版物索引章节
pub const INDEX_CHAPTER: &str = "index";

const UNTITLED: &str = "untitled";

/// Parsed article file / 解析后的文章文件
#[derive(Debug, Clone)]
pub struct ArticleUpload {
    pub topic: Topic,
    pub article: ArticleRecord,
}

/// Parse an `.md` article / 解析文章文件
pub fn parse_file(content: &str, file_name: &str) -> Result<ArticleUpload, IngestError> {
    let (publication, chapter) = split_file_name(file_name)
        .ok_or_else(|| IngestError::InvalidFilename(file_name.to_string()))?;

    let header = parse_header(content)?;
    let field = |key: &str| header.get(key).cloned();

    let title = field("title").or_else(|| {
        H1.captures(content)
            .map(|caps| caps[1].trim_end().to_string())
    });

    let subtitle = field("subtitle").or_else(|| {
        if chapter == INDEX_CHAPTER {
            return None;
        }
        let subtitles: Vec<&str> = H2
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end())
            .collect();
        (!subtitles.is_empty()).then(|| subtitles.join(SUBTITLE_SEPARATOR))
    });

    let group_name = field("group-name").unwrap_or_else(|| PUBLIC_GROUP.to_string());
    let mut topic = Topic::new(TopicKind::Article, file_name, &group_name);
    topic.publication = Some(publication);
    topic.chapter = Some(chapter);
    topic.part = field("part");
    topic.foreign_lang = field("foreign-lang");
    topic.base_lang = field("base-lang");
    topic.sort_index = sort_index(&header);
    topic.title = title;
    topic.subtitle = subtitle;
    topic.author = field("author");
    topic.copyright = field("copyright");
    topic.publisher = field("publisher");
    topic.pub_date = field("pubDate");
    topic.isbn = field("isbn");
    topic.categories = field("categories");

    let article_title = topic.title.clone().unwrap_or_else(|| UNTITLED.to_string());
    topic.hash = Some(content_hash(&topic, &article_title, content)?);

    let all_foreign = header.get("foreign-text").map(String::as_str) == Some("true");
    let html_text = markdown::render(&mark_hashtags(content), all_foreign);

    let article = ArticleRecord {
        topic_id: String::new(),
        file_name: file_name.to_string(),
        group_name,
        title: article_title,
        md_text: content.to_string(),
        html_text,
        index_text: index_text(content),
        hash_tags: extract_hashtags(content),
    };

    Ok(ArticleUpload { topic, article })
}

fn sort_index(header: &HashMap<String, String>) -> i64 {
    header
        .get("sort-index")
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// md5 over the serialized (metadata, content) pair / 内容指纹
fn content_hash(topic: &Topic, title: &str, content: &str) -> Result<String, IngestError> {
    let payload = json!({
        "topic": topic,
        "article": {
            "fileName": topic.file_name,
            "groupName": topic.group_name,
            "title": title,
            "mdText": content,
        }
    });
    let bytes = serde_json::to_vec(&payload)?;
    Ok(format!("{:x}", md5::compute(bytes)))
}

/// Searchable plain text: drop everything through the first `</section>`,
/// then every tag / 生成索引文本
pub fn index_text(content: &str) -> String {
    let body = match SECTION_END.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    };
    TAG.replace_all(body, "").into_owned()
}

/// Insert the article, then one hashtag row per occurrence / 写入文章与标签
pub async fn create_data<S>(store: &S, topic: &Topic, upload: &ArticleUpload) -> Result<(), IngestError>
where
    S: ArticleStore + ?Sized,
{
    let mut article = upload.article.clone();
    article.topic_id = topic.id.clone();
    article.group_name = topic.group_name.clone();
    article.validate().map_err(IngestError::Validation)?;

    store.insert_article(&article).await?;

    if article.hash_tags.is_empty() {
        return Ok(());
    }

    let rows: Vec<HashTagRow> = article
        .hash_tags
        .iter()
        .map(|occurrence| HashTagRow {
            name: occurrence.tag.clone(),
            subtitle: occurrence.subtitle.clone(),
            group_name: topic.group_name.clone(),
            topic_id: topic.id.clone(),
        })
        .collect();
    store.insert_hashtags(&rows).await?;

    tracing::debug!("Inserted {} hashtags for {}", rows.len(), topic.file_name);
    Ok(())
}

/// Delete the topic's articles and hashtags; no-op without a topic
pub async fn remove_data<S>(store: &S, topic: Option<&Topic>) -> Result<(), IngestError>
where
    S: ArticleStore + ?Sized,
{
    if let Some(topic) = topic {
        store.delete_articles(&topic.id).await?;
        store.delete_hashtags(&topic.id).await?;
    }
    Ok(())
}
