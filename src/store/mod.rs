//! Document store collaborator / 文档存储接口
//!
//! The core only knows these traits. `SqliteStore` is the production
//! implementation; tests swap in small in-memory stubs where call counts
//! matter.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{
    ArticleRecord, AutoCompleteItem, HashTagRow, LemmaRow, Topic, TopicKind,
};

pub use sqlite::SqliteStore;

/// Topic listing order / 主题排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopicOrder {
    #[default]
    Publication,
    /// sortIndex, part, title
    Chapter,
    /// publication, sortIndex, title
    Catalog,
    GroupName,
}

/// Topic filter; `None` fields are unconstrained / 主题查询条件
#[derive(Debug, Clone, Default)]
pub struct TopicQuery {
    pub kind: Option<TopicKind>,
    pub publication: Option<String>,
    pub chapter: Option<String>,
    /// Allowed group names; `None` means every group
    pub groups: Option<Vec<String>>,
    pub order: TopicOrder,
}

/// Exact-word lemma lookup / 词条查询条件
#[derive(Debug, Clone, Default)]
pub struct LemmaQuery {
    pub word: String,
    pub attr: Option<String>,
    pub lang: Option<String>,
    pub groups: Option<Vec<String>>,
    /// `(offset, limit)`; `None` returns every row
    pub page: Option<(usize, usize)>,
}

/// Hashtag row joined with its owning topic / 标签及所属主题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaggedTopic {
    pub subtitle: String,
    pub title: Option<String>,
    pub publication: Option<String>,
    pub chapter: Option<String>,
}

/// Occurrence count per tag name / 标签计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HashTagCount {
    pub name: String,
    pub count: i64,
}

#[async_trait]
pub trait TopicStore: Send + Sync {
    async fn find_topic(&self, file_name: &str) -> StoreResult<Option<Topic>>;

    async fn find_topics(&self, query: &TopicQuery) -> StoreResult<Vec<Topic>>;

    /// Insert or replace by `file_name`, keeping the id of an existing row.
    /// Returns the stored topic with `id` and `last_modified` filled in.
    async fn upsert_topic(&self, topic: &Topic) -> StoreResult<Topic>;

    async fn delete_topic(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert_article(&self, article: &ArticleRecord) -> StoreResult<()>;

    async fn find_article(&self, file_name: &str) -> StoreResult<Option<ArticleRecord>>;

    /// Topics whose article index text contains every term (case-insensitive)
    async fn search_articles(
        &self,
        terms: &[String],
        groups: Option<&[String]>,
    ) -> StoreResult<Vec<Topic>>;

    async fn delete_articles(&self, topic_id: &str) -> StoreResult<u64>;

    async fn insert_hashtags(&self, rows: &[HashTagRow]) -> StoreResult<()>;

    async fn find_hashtags(
        &self,
        name: &str,
        groups: Option<&[String]>,
    ) -> StoreResult<Vec<TaggedTopic>>;

    async fn count_hashtags(&self, groups: Option<&[String]>) -> StoreResult<Vec<HashTagCount>>;

    async fn delete_hashtags(&self, topic_id: &str) -> StoreResult<u64>;
}

#[async_trait]
pub trait LemmaStore: Send + Sync {
    async fn insert_lemmas(&self, rows: &[LemmaRow]) -> StoreResult<()>;

    /// Rows sorted by (word, order) / 按 (word, order) 排序
    async fn find_lemmas(&self, query: &LemmaQuery) -> StoreResult<Vec<LemmaRow>>;

    async fn distinct_langs(&self) -> StoreResult<Vec<String>>;

    async fn distinct_words(&self, lang: &str) -> StoreResult<Vec<String>>;

    async fn delete_lemmas(&self, topic_id: &str) -> StoreResult<u64>;
}

/// Derived autocomplete index / 自动补全索引
#[async_trait]
pub trait WordStore: Send + Sync {
    async fn clear_words(&self) -> StoreResult<()>;

    async fn insert_words(&self, items: &[AutoCompleteItem]) -> StoreResult<()>;

    /// Case-sensitive prefix match, ordered by word
    async fn find_words_by_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> StoreResult<Vec<AutoCompleteItem>>;
}

/// Everything the ingestion and query services need / 完整存储接口
pub trait Store: TopicStore + ArticleStore + LemmaStore + WordStore {}

impl<T: TopicStore + ArticleStore + LemmaStore + WordStore> Store for T {}
