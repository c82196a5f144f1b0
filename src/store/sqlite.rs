//! SQLite-backed store / SQLite 存储实现
//!
//! 特性：
//! - WAL模式 + busy_timeout（并发安全）
//! - 批量插入在单个事务内执行，遇到锁冲突最多重试3次
//! - 分组过滤通过 json_each 绑定，查询语句保持静态

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use super::{
    ArticleStore, HashTagCount, LemmaQuery, LemmaStore, TaggedTopic, TopicOrder, TopicQuery,
    TopicStore, WordStore,
};
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::models::{ArticleRecord, AutoCompleteItem, HashTagRow, LemmaRow, Topic};

const MAX_RETRIES: usize = 3;

/// Store over one SQLite pool / SQLite 存储
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 使用现有数据库连接池
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fresh in-memory database with the schema applied
    pub async fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(db::connect_in_memory().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a write, retrying while the database is locked / 锁冲突时重试
    async fn with_retry<F, Fut>(&self, what: &str, op: F) -> StoreResult<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), sqlx::Error>>,
    {
        let mut last_error = String::new();

        for attempt in 0..MAX_RETRIES {
            match op().await {
                Ok(()) => return Ok(()),
                Err(e) if is_busy(&e) => {
                    last_error = e.to_string();
                    let delay = 100 * (attempt as u64 + 1);
                    tracing::debug!(
                        "Database locked during {}, retrying in {}ms (attempt {}/{})",
                        what,
                        delay,
                        attempt + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Busy { attempts: MAX_RETRIES, message: last_error })
    }

    async fn do_insert_hashtags(&self, rows: &[HashTagRow]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                "INSERT INTO hashtags (name, subtitle, group_name, topic_id) VALUES (?, ?, ?, ?)",
            )
            .bind(&row.name)
            .bind(&row.subtitle)
            .bind(&row.group_name)
            .bind(&row.topic_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    async fn do_insert_lemmas(&self, rows: &[LemmaRow]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO lemmas
                    (word, lang, base_word, base_lang, word_order, homonym, attr, text, group_name, topic_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.word)
            .bind(&row.lang)
            .bind(&row.base_word)
            .bind(&row.base_lang)
            .bind(row.order)
            .bind(row.homonym)
            .bind(&row.attr)
            .bind(&row.text)
            .bind(&row.group_name)
            .bind(&row.topic_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    async fn do_insert_words(&self, items: &[AutoCompleteItem]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query("INSERT INTO words (word, lang) VALUES (?, ?)")
                .bind(&item.word)
                .bind(&item.lang)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await
    }
}

fn is_busy(e: &sqlx::Error) -> bool {
    let message = e.to_string();
    message.contains("database is locked") || message.contains("SQLITE_BUSY")
}

/// Group list as a JSON array for `json_each`; `None` disables the filter
fn groups_param(groups: Option<&[String]>) -> StoreResult<Option<String>> {
    Ok(match groups {
        Some(groups) => Some(serde_json::to_string(groups)?),
        None => None,
    })
}

fn like_escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Literal GLOB prefix pattern
fn glob_prefix(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        match c {
            '*' | '?' | '[' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out.push('*');
    out
}

fn article_from_row(row: &SqliteRow) -> StoreResult<ArticleRecord> {
    let hash_tags: String = row.try_get("hash_tags")?;
    Ok(ArticleRecord {
        topic_id: row.try_get("topic_id")?,
        file_name: row.try_get("file_name")?,
        group_name: row.try_get("group_name")?,
        title: row.try_get("title")?,
        md_text: row.try_get("md_text")?,
        html_text: row.try_get("html_text")?,
        index_text: row.try_get("index_text")?,
        hash_tags: serde_json::from_str(&hash_tags)?,
    })
}

#[async_trait]
impl TopicStore for SqliteStore {
    async fn find_topic(&self, file_name: &str) -> StoreResult<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE file_name = ?")
            .bind(file_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(topic)
    }

    async fn find_topics(&self, query: &TopicQuery) -> StoreResult<Vec<Topic>> {
        let order = match query.order {
            TopicOrder::Publication => "publication",
            TopicOrder::Chapter => "sort_index, part, title",
            TopicOrder::Catalog => "publication, sort_index, title",
            TopicOrder::GroupName => "group_name, publication",
        };
        let sql = format!(
            r#"
            SELECT * FROM topics
            WHERE (? IS NULL OR type = ?)
              AND (? IS NULL OR publication = ?)
              AND (? IS NULL OR chapter = ?)
              AND (? IS NULL OR group_name IN (SELECT value FROM json_each(?)))
            ORDER BY {}
            "#,
            order
        );

        let kind = query.kind.map(|k| k.as_str());
        let groups = groups_param(query.groups.as_deref())?;

        let topics = sqlx::query_as::<_, Topic>(&sql)
            .bind(kind)
            .bind(kind)
            .bind(&query.publication)
            .bind(&query.publication)
            .bind(&query.chapter)
            .bind(&query.chapter)
            .bind(&groups)
            .bind(&groups)
            .fetch_all(&self.pool)
            .await?;
        Ok(topics)
    }

    async fn upsert_topic(&self, topic: &Topic) -> StoreResult<Topic> {
        let id = if topic.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            topic.id.clone()
        };
        let now = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO topics (
                id, type, file_name, publication, chapter, part, foreign_lang, base_lang,
                group_name, sort_index, title, subtitle, author, copyright, publisher,
                pub_date, isbn, categories, hash, last_modified
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(file_name) DO UPDATE SET
                type = excluded.type,
                publication = excluded.publication,
                chapter = excluded.chapter,
                part = excluded.part,
                foreign_lang = excluded.foreign_lang,
                base_lang = excluded.base_lang,
                group_name = excluded.group_name,
                sort_index = excluded.sort_index,
                title = excluded.title,
                subtitle = excluded.subtitle,
                author = excluded.author,
                copyright = excluded.copyright,
                publisher = excluded.publisher,
                pub_date = excluded.pub_date,
                isbn = excluded.isbn,
                categories = excluded.categories,
                hash = excluded.hash,
                last_modified = excluded.last_modified
            "#,
        )
        .bind(&id)
        .bind(topic.kind.as_str())
        .bind(&topic.file_name)
        .bind(&topic.publication)
        .bind(&topic.chapter)
        .bind(&topic.part)
        .bind(&topic.foreign_lang)
        .bind(&topic.base_lang)
        .bind(&topic.group_name)
        .bind(topic.sort_index)
        .bind(&topic.title)
        .bind(&topic.subtitle)
        .bind(&topic.author)
        .bind(&topic.copyright)
        .bind(&topic.publisher)
        .bind(&topic.pub_date)
        .bind(&topic.isbn)
        .bind(&topic.categories)
        .bind(&topic.hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE file_name = ?")
            .bind(&topic.file_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn delete_topic(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn insert_article(&self, article: &ArticleRecord) -> StoreResult<()> {
        let hash_tags = serde_json::to_string(&article.hash_tags)?;
        sqlx::query(
            r#"
            INSERT INTO articles
                (topic_id, file_name, group_name, title, md_text, html_text, index_text, hash_tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.topic_id)
        .bind(&article.file_name)
        .bind(&article.group_name)
        .bind(&article.title)
        .bind(&article.md_text)
        .bind(&article.html_text)
        .bind(&article.index_text)
        .bind(&hash_tags)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_article(&self, file_name: &str) -> StoreResult<Option<ArticleRecord>> {
        let row = sqlx::query("SELECT * FROM articles WHERE file_name = ? ORDER BY id DESC LIMIT 1")
            .bind(file_name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn search_articles(
        &self,
        terms: &[String],
        groups: Option<&[String]>,
    ) -> StoreResult<Vec<Topic>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r#"
            SELECT t.* FROM articles a
            JOIN topics t ON t.id = a.topic_id
            WHERE (? IS NULL OR a.group_name IN (SELECT value FROM json_each(?)))
            "#,
        );
        for _ in terms {
            sql.push_str(" AND a.index_text LIKE ? ESCAPE '\\'");
        }
        sql.push_str(" ORDER BY t.publication, t.sort_index, t.title");

        let groups = groups_param(groups)?;
        let mut query = sqlx::query_as::<_, Topic>(&sql).bind(groups.clone()).bind(groups);
        for term in terms {
            query = query.bind(format!("%{}%", like_escape(term)));
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn delete_articles(&self, topic_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM articles WHERE topic_id = ?")
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_hashtags(&self, rows: &[HashTagRow]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.with_retry("hashtag insert", || self.do_insert_hashtags(rows)).await
    }

    async fn find_hashtags(
        &self,
        name: &str,
        groups: Option<&[String]>,
    ) -> StoreResult<Vec<TaggedTopic>> {
        let groups = groups_param(groups)?;
        let rows = sqlx::query_as::<_, TaggedTopic>(
            r#"
            SELECT h.subtitle, t.title, t.publication, t.chapter
            FROM hashtags h
            JOIN topics t ON t.id = h.topic_id
            WHERE h.name = ?
              AND (? IS NULL OR h.group_name IN (SELECT value FROM json_each(?)))
            ORDER BY h.id
            "#,
        )
        .bind(name)
        .bind(&groups)
        .bind(&groups)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_hashtags(&self, groups: Option<&[String]>) -> StoreResult<Vec<HashTagCount>> {
        let groups = groups_param(groups)?;
        let counts = sqlx::query_as::<_, HashTagCount>(
            r#"
            SELECT name, COUNT(*) AS count
            FROM hashtags
            WHERE (? IS NULL OR group_name IN (SELECT value FROM json_each(?)))
            GROUP BY name
            ORDER BY name
            "#,
        )
        .bind(&groups)
        .bind(&groups)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn delete_hashtags(&self, topic_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM hashtags WHERE topic_id = ?")
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LemmaStore for SqliteStore {
    async fn insert_lemmas(&self, rows: &[LemmaRow]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.with_retry("lemma insert", || self.do_insert_lemmas(rows)).await
    }

    async fn find_lemmas(&self, query: &LemmaQuery) -> StoreResult<Vec<LemmaRow>> {
        // SQLite treats a negative LIMIT as "no limit"
        let (offset, limit) = match query.page {
            Some((offset, limit)) => (
                i64::try_from(offset).unwrap_or(i64::MAX),
                i64::try_from(limit).unwrap_or(i64::MAX),
            ),
            None => (0, -1),
        };
        let groups = groups_param(query.groups.as_deref())?;

        let rows = sqlx::query_as::<_, LemmaRow>(
            r#"
            SELECT word, lang, base_word, base_lang, word_order, homonym, attr, text, group_name, topic_id
            FROM lemmas
            WHERE word = ?
              AND (? IS NULL OR attr = ?)
              AND (? IS NULL OR lang = ?)
              AND (? IS NULL OR group_name IN (SELECT value FROM json_each(?)))
            ORDER BY word, word_order, id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&query.word)
        .bind(&query.attr)
        .bind(&query.attr)
        .bind(&query.lang)
        .bind(&query.lang)
        .bind(&groups)
        .bind(&groups)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn distinct_langs(&self) -> StoreResult<Vec<String>> {
        let langs = sqlx::query_scalar::<_, String>("SELECT DISTINCT lang FROM lemmas ORDER BY lang")
            .fetch_all(&self.pool)
            .await?;
        Ok(langs)
    }

    async fn distinct_words(&self, lang: &str) -> StoreResult<Vec<String>> {
        let words = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT word FROM lemmas WHERE lang = ? ORDER BY word",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;
        Ok(words)
    }

    async fn delete_lemmas(&self, topic_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM lemmas WHERE topic_id = ?")
            .bind(topic_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl WordStore for SqliteStore {
    async fn clear_words(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM words").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_words(&self, items: &[AutoCompleteItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.with_retry("word insert", || self.do_insert_words(items)).await
    }

    async fn find_words_by_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> StoreResult<Vec<AutoCompleteItem>> {
        let items = sqlx::query_as::<_, AutoCompleteItem>(
            "SELECT word, lang FROM words WHERE word GLOB ? ORDER BY word LIMIT ?",
        )
        .bind(glob_prefix(prefix))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HashTagOccurrence, TopicKind};

    fn lemma(word: &str, order: i64, attr: &str, text: &str, group: &str) -> LemmaRow {
        LemmaRow {
            word: word.to_string(),
            lang: "id".to_string(),
            base_word: text.to_string(),
            base_lang: "nl".to_string(),
            order,
            homonym: 0,
            attr: attr.to_string(),
            text: text.to_string(),
            group_name: group.to_string(),
            topic_id: "t1".to_string(),
        }
    }

    fn article_topic(file_name: &str, publication: &str, chapter: &str, group: &str) -> Topic {
        let mut topic = Topic::new(TopicKind::Article, file_name, group);
        topic.publication = Some(publication.to_string());
        topic.chapter = Some(chapter.to_string());
        topic.title = Some(format!("{} {}", publication, chapter));
        topic
    }

    #[test]
    fn test_escaping() {
        assert_eq!(like_escape("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(glob_prefix("ab*c?[d"), "ab[*]c[?][[]d*");
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_resets_fields() {
        let store = SqliteStore::in_memory().await.unwrap();

        let mut topic = article_topic("boek.les1.md", "boek", "les1", "public");
        topic.author = Some("Teeuw".to_string());
        let first = store.upsert_topic(&topic).await.unwrap();
        assert!(!first.id.is_empty());
        assert!(first.last_modified.is_some());

        let second = store
            .upsert_topic(&article_topic("boek.les1.md", "boek", "les1", "teeuw"))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.group_name, "teeuw");
        assert_eq!(second.author, None);

        let all = store.find_topics(&TopicQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        store.delete_topic(&first.id).await.unwrap();
        assert!(store.find_topic("boek.les1.md").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_topics_filters_by_group() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.upsert_topic(&article_topic("b.index.md", "b", "index", "public")).await.unwrap();
        store.upsert_topic(&article_topic("a.index.md", "a", "index", "teeuw")).await.unwrap();
        store.upsert_topic(&article_topic("a.les1.md", "a", "les1", "teeuw")).await.unwrap();

        let query = TopicQuery {
            kind: Some(TopicKind::Article),
            chapter: Some("index".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = store
            .find_topics(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.file_name)
            .collect();
        assert_eq!(names, vec!["a.index.md", "b.index.md"]);

        let query = TopicQuery { groups: Some(vec!["public".to_string()]), ..query };
        let public = store.find_topics(&query).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].file_name, "b.index.md");
    }

    #[tokio::test]
    async fn test_find_lemmas_sorting_paging_and_filters() {
        let store = SqliteStore::in_memory().await.unwrap();
        let rows = vec![
            lemma("rumah", 2, "i", "rumah sakit", "public"),
            lemma("rumah", 1, "k", "rumah", "public"),
            lemma("rumah", 3, "i", "rumah makan", "teeuw"),
            lemma("besar", 1, "k", "besar", "public"),
        ];
        store.insert_lemmas(&rows).await.unwrap();

        let query = LemmaQuery { word: "rumah".to_string(), ..Default::default() };
        let found = store.find_lemmas(&query).await.unwrap();
        let orders: Vec<i64> = found.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        let paged = LemmaQuery { page: Some((1, 1)), ..query.clone() };
        assert_eq!(store.find_lemmas(&paged).await.unwrap()[0].text, "rumah sakit");

        let keyed = LemmaQuery { attr: Some("k".to_string()), ..query.clone() };
        assert_eq!(store.find_lemmas(&keyed).await.unwrap().len(), 1);

        let public = LemmaQuery { groups: Some(vec!["public".to_string()]), ..query.clone() };
        assert_eq!(store.find_lemmas(&public).await.unwrap().len(), 2);

        let dutch = LemmaQuery { lang: Some("nl".to_string()), ..query };
        assert!(store.find_lemmas(&dutch).await.unwrap().is_empty());

        assert_eq!(store.distinct_langs().await.unwrap(), vec!["id"]);
        assert_eq!(store.distinct_words("id").await.unwrap(), vec!["besar", "rumah"]);

        assert_eq!(store.delete_lemmas("t1").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_prefix_lookup_is_case_sensitive() {
        let store = SqliteStore::in_memory().await.unwrap();
        let items: Vec<AutoCompleteItem> = ["rumah", "rumput", "Rusia", "besar"]
            .iter()
            .map(|w| AutoCompleteItem { word: w.to_string(), lang: "id".to_string() })
            .collect();
        store.insert_words(&items).await.unwrap();

        let found = store.find_words_by_prefix("ru", 10).await.unwrap();
        let words: Vec<&str> = found.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["rumah", "rumput"]);

        assert_eq!(store.find_words_by_prefix("ru", 1).await.unwrap().len(), 1);

        store.clear_words().await.unwrap();
        assert!(store.find_words_by_prefix("ru", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_articles_and_hashtags() {
        let store = SqliteStore::in_memory().await.unwrap();
        let topic = store
            .upsert_topic(&article_topic("boek.les1.md", "boek", "les1", "public"))
            .await
            .unwrap();

        let article = ArticleRecord {
            topic_id: topic.id.clone(),
            file_name: topic.file_name.clone(),
            group_name: "public".to_string(),
            title: "Les 1".to_string(),
            md_text: "# Les 1".to_string(),
            html_text: "<h1>Les 1</h1>".to_string(),
            index_text: "Rumah besar di kota".to_string(),
            hash_tags: vec![HashTagOccurrence { tag: "kota".to_string(), subtitle: "".to_string() }],
        };
        store.insert_article(&article).await.unwrap();

        let loaded = store.find_article("boek.les1.md").await.unwrap().unwrap();
        assert_eq!(loaded.hash_tags, article.hash_tags);

        let terms = vec!["rumah".to_string(), "KOTA".to_string()];
        assert_eq!(store.search_articles(&terms, None).await.unwrap().len(), 1);
        let terms = vec!["rumah".to_string(), "desa".to_string()];
        assert!(store.search_articles(&terms, None).await.unwrap().is_empty());
        let private = vec!["teeuw".to_string()];
        let terms = vec!["rumah".to_string()];
        assert!(store.search_articles(&terms, Some(private.as_slice())).await.unwrap().is_empty());

        let rows = vec![
            HashTagRow {
                name: "kota".to_string(),
                subtitle: "Woorden".to_string(),
                group_name: "public".to_string(),
                topic_id: topic.id.clone(),
            },
            HashTagRow {
                name: "kota".to_string(),
                subtitle: "Zinnen".to_string(),
                group_name: "public".to_string(),
                topic_id: topic.id.clone(),
            },
            HashTagRow {
                name: "desa".to_string(),
                subtitle: "".to_string(),
                group_name: "teeuw".to_string(),
                topic_id: topic.id.clone(),
            },
        ];
        store.insert_hashtags(&rows).await.unwrap();

        let found = store.find_hashtags("kota", None).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].publication.as_deref(), Some("boek"));
        assert_eq!(found[1].subtitle, "Zinnen");

        let public = vec!["public".to_string()];
        let counts = store.count_hashtags(Some(public.as_slice())).await.unwrap();
        assert_eq!(counts, vec![HashTagCount { name: "kota".to_string(), count: 2 }]);

        assert_eq!(store.delete_hashtags(&topic.id).await.unwrap(), 3);
        assert_eq!(store.delete_articles(&topic.id).await.unwrap(), 1);
    }
}
