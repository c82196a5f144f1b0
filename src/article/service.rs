//! Article retrieval, article search and hashtag queries / 文章查询服务

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::loader::INDEX_CHAPTER;
use crate::error::{IngestError, StoreResult};
use crate::events::CacheSubscription;
use crate::markdown;
use crate::models::{ArticleRecord, Caller, Topic, TopicKind};
use crate::store::{ArticleStore, HashTagCount, TopicQuery, TopicStore};

/// Raw markdown is only shipped to clients that render it themselves
static CONTENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!-- flashcard -->|<!-- translate-start -->").unwrap());

static SEARCH_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-'\w]+").unwrap());

const UNKNOWN_PUBLICATION: &str = "??";

/// One hashtag hit / 标签搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashTagItem {
    pub title: Option<String>,
    pub subtitle: String,
    pub pub_title: String,
    pub publication: Option<String>,
    pub chapter: Option<String>,
}

/// Tags sharing an upper-cased first letter / 按首字母分组的标签
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashTagGroup {
    pub letter: String,
    pub tags: Vec<HashTagCount>,
}

struct IndexTopicCache {
    topics: Option<Vec<Topic>>,
    events: Option<CacheSubscription>,
}

pub struct ArticleService<S: ?Sized> {
    store: Arc<S>,
    index_topics: Mutex<IndexTopicCache>,
}

impl<S> ArticleService<S>
where
    S: TopicStore + ArticleStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::build(store, None)
    }

    /// Service whose cached index topics follow cache invalidations
    pub fn with_events(store: Arc<S>, events: CacheSubscription) -> Self {
        Self::build(store, Some(events))
    }

    fn build(store: Arc<S>, events: Option<CacheSubscription>) -> Self {
        Self {
            store,
            index_topics: Mutex::new(IndexTopicCache { topics: None, events }),
        }
    }

    /// Load an article, optionally highlighting a phrase / 获取文章（可高亮）
    pub async fn get_article(
        &self,
        file_name: &str,
        highlight_phrase: Option<&str>,
        caller: &Caller,
    ) -> Result<ArticleRecord, IngestError> {
        let mut article = self
            .store
            .find_article(file_name)
            .await?
            .ok_or_else(|| IngestError::NotFound(file_name.to_string()))?;

        if !caller.can_read(&article.group_name) {
            tracing::warn!("access denied: {}", article.file_name);
            return Err(IngestError::Unauthorized(article.file_name));
        }

        if let Some(phrase) = highlight_phrase.map(str::trim).filter(|p| !p.is_empty()) {
            let highlighted = markdown::highlight(&article.md_text, phrase);
            article.html_text = markdown::render(&highlighted, true);
        }

        if !CONTENT_MARKER.is_match(&article.md_text) {
            article.md_text.clear();
        }
        article.index_text.clear();

        tracing::info!("fetched article {}", article.file_name);
        Ok(article)
    }

    /// Topics whose article text contains every term / 文章全文搜索
    pub async fn search_articles(&self, phrase: &str, caller: &Caller) -> StoreResult<Vec<Topic>> {
        let terms = search_terms(phrase);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let groups = caller.authorized_groups();
        self.store.search_articles(&terms, groups.as_deref()).await
    }

    /// Occurrences of one tag with their topic and publication titles / 标签搜索
    pub async fn search_hashtags(
        &self,
        name: &str,
        caller: &Caller,
    ) -> Result<Vec<HashTagItem>, IngestError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IngestError::Validation("hashtag name is required".to_string()));
        }

        let index_topics = self.index_topics().await?;
        let groups = caller.authorized_groups();
        let tagged = self.store.find_hashtags(name, groups.as_deref()).await?;

        let mut items: Vec<HashTagItem> = tagged
            .into_iter()
            .map(|hit| {
                let pub_title = index_topics
                    .iter()
                    .find(|topic| topic.publication == hit.publication)
                    .and_then(|topic| topic.title.clone())
                    .unwrap_or_else(|| UNKNOWN_PUBLICATION.to_string());
                HashTagItem {
                    title: hit.title,
                    subtitle: hit.subtitle,
                    pub_title,
                    publication: hit.publication,
                    chapter: hit.chapter,
                }
            })
            .collect();

        items.sort_by_cached_key(|item| {
            format!("{}.{}", item.pub_title, item.title.as_deref().unwrap_or("")).to_lowercase()
        });
        Ok(items)
    }

    /// Tag counts grouped by first letter / 所有标签（按首字母分组）
    pub async fn all_hashtags(&self, caller: &Caller) -> StoreResult<Vec<HashTagGroup>> {
        let groups = caller.authorized_groups();
        let counts = self.store.count_hashtags(groups.as_deref()).await?;
        Ok(group_by_letter(counts))
    }

    async fn index_topics(&self) -> StoreResult<Vec<Topic>> {
        {
            let mut cache = self.index_topics.lock();
            let invalidated = cache
                .events
                .as_mut()
                .map(|events| events.take_invalidation())
                .unwrap_or(false);
            if invalidated {
                tracing::debug!("Invalidating cached index topics");
                cache.topics = None;
            }
            if let Some(topics) = &cache.topics {
                return Ok(topics.clone());
            }
        }

        let query = TopicQuery {
            kind: Some(TopicKind::Article),
            chapter: Some(INDEX_CHAPTER.to_string()),
            ..Default::default()
        };
        let topics = self.store.find_topics(&query).await?;
        tracing::debug!("Caching {} index topics", topics.len());
        self.index_topics.lock().topics = Some(topics.clone());
        Ok(topics)
    }
}

/// A quoted phrase is one term; otherwise every word is a term / 拆分搜索词
pub fn search_terms(phrase: &str) -> Vec<String> {
    let phrase = phrase.trim();
    if phrase.len() > 1 && phrase.starts_with('"') && phrase.ends_with('"') {
        let inner = phrase[1..phrase.len() - 1].trim();
        return if inner.is_empty() { Vec::new() } else { vec![inner.to_string()] };
    }
    SEARCH_WORD
        .find_iter(phrase)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn group_by_letter(counts: Vec<HashTagCount>) -> Vec<HashTagGroup> {
    let mut groups: BTreeMap<String, Vec<HashTagCount>> = BTreeMap::new();
    for count in counts {
        let letter = count
            .name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default();
        groups.entry(letter).or_default().push(count);
    }

    groups
        .into_iter()
        .map(|(letter, mut tags)| {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
            HashTagGroup { letter, tags }
        })
        .collect()
}
