//! Dictionary lookup and autocomplete / 词典检索与自动补全

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::cache::AutoCompleteCache;
use crate::error::StoreResult;
use crate::models::{AutoCompleteItem, LemmaRow};
use crate::store::{LemmaQuery, LemmaStore, WordStore};

static VALID_AUTOCOMPLETE_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-'()\p{L}]+$").unwrap());

pub const CHUNK_SIZE: usize = 50;
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Attribute value that restricts a lookup; any other value means "any"
const KEYWORD_ATTR: &str = "k";

/// One page of lemma rows / 词典检索结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictSearchResult {
    pub lemmas: Vec<LemmaRow>,
    /// True when the raw page was exactly full; the next page may still be empty
    pub has_more: bool,
}

pub struct SearchEngine<S: ?Sized> {
    store: Arc<S>,
    cache: Arc<AutoCompleteCache>,
    chunk_size: usize,
    autocomplete_limit: usize,
}

impl<S> SearchEngine<S>
where
    S: LemmaStore + WordStore + ?Sized,
{
    pub fn new(store: Arc<S>, cache: Arc<AutoCompleteCache>) -> Self {
        Self { store, cache, chunk_size: CHUNK_SIZE, autocomplete_limit: AUTOCOMPLETE_LIMIT }
    }

    pub fn with_limits(mut self, chunk_size: usize, autocomplete_limit: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.autocomplete_limit = autocomplete_limit;
        self
    }

    pub fn cache(&self) -> &Arc<AutoCompleteCache> {
        &self.cache
    }

    /// Look up `words` in order, stopping at the first one with any rows.
    ///
    /// `chunk` selects a page of `chunk_size` rows; a negative chunk returns
    /// every row. `groups` of `None` disables group filtering (admin).
    /// 依次查找，首个非空结果即返回
    pub async fn dict_search(
        &self,
        words: &[String],
        attr: &str,
        chunk: i64,
        lang: Option<&str>,
        groups: Option<&[String]>,
    ) -> StoreResult<DictSearchResult> {
        let page = if chunk < 0 {
            None
        } else {
            let offset = usize::try_from(chunk)
                .ok()
                .and_then(|c| c.checked_mul(self.chunk_size))
                .filter(|offset| i64::try_from(*offset).is_ok());
            match offset {
                Some(offset) => Some((offset, self.chunk_size)),
                None => {
                    tracing::debug!("chunk {} is past any page", chunk);
                    return Ok(DictSearchResult { lemmas: Vec::new(), has_more: false });
                }
            }
        };

        let mut rows = Vec::new();
        for word in words {
            let query = LemmaQuery {
                word: word.clone(),
                attr: (attr == KEYWORD_ATTR).then(|| KEYWORD_ATTR.to_string()),
                lang: lang.filter(|l| !l.is_empty()).map(str::to_string),
                groups: groups.map(<[String]>::to_vec),
                page,
            };
            rows = self.store.find_lemmas(&query).await?;
            if !rows.is_empty() {
                break;
            }
        }

        let has_more = rows.len() == self.chunk_size;

        let mut seen = HashSet::new();
        rows.retain(|row| seen.insert(row.text.clone()));

        Ok(DictSearchResult { lemmas: rows, has_more })
    }

    /// Up to `autocomplete_limit` words starting with `prefix` / 前缀补全
    pub async fn autocomplete(&self, prefix: &str) -> StoreResult<Vec<AutoCompleteItem>> {
        let prefix = prefix.trim();
        if prefix.is_empty() || !VALID_AUTOCOMPLETE_TEXT.is_match(prefix) {
            return Ok(Vec::new());
        }

        if let Some(items) = self.cache.get(prefix) {
            tracing::trace!("cache hit for '{}'", prefix);
            return Ok(items);
        }

        let items = self.store.find_words_by_prefix(prefix, self.autocomplete_limit).await?;
        self.cache.set(prefix, items.clone());
        tracing::trace!("cache store for '{}'", prefix);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn row(word: &str, order: i64, text: &str) -> LemmaRow {
        LemmaRow {
            word: word.to_string(),
            lang: "id".to_string(),
            base_word: text.to_string(),
            base_lang: "nl".to_string(),
            order,
            homonym: 0,
            attr: "k".to_string(),
            text: text.to_string(),
            group_name: "public".to_string(),
            topic_id: "t1".to_string(),
        }
    }

    /// Serves canned rows per word and records every call
    #[derive(Default)]
    struct CountingStore {
        lemmas: HashMap<String, Vec<LemmaRow>>,
        words: Vec<AutoCompleteItem>,
        looked_up: Mutex<Vec<String>>,
        prefix_queries: AtomicUsize,
    }

    #[async_trait]
    impl LemmaStore for CountingStore {
        async fn insert_lemmas(&self, _rows: &[LemmaRow]) -> StoreResult<()> {
            Ok(())
        }
        async fn find_lemmas(&self, query: &LemmaQuery) -> StoreResult<Vec<LemmaRow>> {
            self.looked_up.lock().push(query.word.clone());
            Ok(self.lemmas.get(&query.word).cloned().unwrap_or_default())
        }
        async fn distinct_langs(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn distinct_words(&self, _lang: &str) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn delete_lemmas(&self, _topic_id: &str) -> StoreResult<u64> {
            Ok(0)
        }
    }

    #[async_trait]
    impl WordStore for CountingStore {
        async fn clear_words(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn insert_words(&self, _items: &[AutoCompleteItem]) -> StoreResult<()> {
            Ok(())
        }
        async fn find_words_by_prefix(
            &self,
            prefix: &str,
            limit: usize,
        ) -> StoreResult<Vec<AutoCompleteItem>> {
            self.prefix_queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .words
                .iter()
                .filter(|i| i.word.starts_with(prefix))
                .take(limit)
                .cloned()
                .collect())
        }
    }

    fn engine(store: CountingStore) -> (Arc<CountingStore>, SearchEngine<CountingStore>) {
        let store = Arc::new(store);
        let cache = Arc::new(AutoCompleteCache::new(500, Duration::from_secs(3600)));
        (store.clone(), SearchEngine::new(store, cache))
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fallback_to_next_word_when_empty() {
        let mut store = CountingStore::default();
        store.lemmas.insert("beta".to_string(), vec![row("beta", 1, "b1"), row("beta", 2, "b2")]);
        let (store, engine) = engine(store);

        let result = engine.dict_search(&words(&["alpha", "beta"]), "", 0, None, None).await.unwrap();
        assert_eq!(result.lemmas, vec![row("beta", 1, "b1"), row("beta", 2, "b2")]);
        assert_eq!(*store.looked_up.lock(), words(&["alpha", "beta"]));
    }

    #[tokio::test]
    async fn test_first_non_empty_wins() {
        let mut store = CountingStore::default();
        store.lemmas.insert("alpha".to_string(), vec![row("alpha", 1, "a1")]);
        store.lemmas.insert("beta".to_string(), vec![row("beta", 1, "b1")]);
        let (store, engine) = engine(store);

        let result = engine.dict_search(&words(&["alpha", "beta"]), "", 0, None, None).await.unwrap();
        assert_eq!(result.lemmas, vec![row("alpha", 1, "a1")]);
        // beta never queried
        assert_eq!(*store.looked_up.lock(), words(&["alpha"]));
    }

    #[tokio::test]
    async fn test_all_empty_gives_empty_result() {
        let (_, engine) = engine(CountingStore::default());
        let result = engine.dict_search(&words(&["x", "y"]), "", 0, None, None).await.unwrap();
        assert!(result.lemmas.is_empty());
        assert!(!result.has_more);
    }

    #[tokio::test]
    async fn test_dedup_by_text_keeps_first() {
        let mut store = CountingStore::default();
        store.lemmas.insert(
            "rumah".to_string(),
            vec![row("rumah", 1, "rumah"), row("rumah", 2, "Rumah"), row("rumah", 3, "rumah")],
        );
        let (_, engine) = engine(store);

        let result = engine.dict_search(&words(&["rumah"]), "", 0, None, None).await.unwrap();
        let orders: Vec<i64> = result.lemmas.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_has_more_is_full_page_approximation() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        // exactly one full page
        let rows: Vec<LemmaRow> = (0..50).map(|i| row("kata", i, &format!("kata {}", i))).collect();
        store.insert_lemmas(&rows).await.unwrap();

        let cache = Arc::new(AutoCompleteCache::new(500, Duration::from_secs(3600)));
        let engine = SearchEngine::new(store, cache);

        // full first page reports more even though nothing follows
        let first = engine.dict_search(&words(&["kata"]), "k", 0, Some("id"), None).await.unwrap();
        assert_eq!(first.lemmas.len(), 50);
        assert!(first.has_more);

        let second = engine.dict_search(&words(&["kata"]), "k", 1, Some("id"), None).await.unwrap();
        assert!(second.lemmas.is_empty());
        assert!(!second.has_more);

        // chunk -1 returns every row
        let all = engine.dict_search(&words(&["kata"]), "", -1, None, None).await.unwrap();
        assert_eq!(all.lemmas.len(), 50);

        let public = vec!["public".to_string()];
        let other = vec!["teeuw".to_string()];
        let visible = engine.dict_search(&words(&["kata"]), "", 0, None, Some(public.as_slice())).await.unwrap();
        assert_eq!(visible.lemmas.len(), 50);
        let hidden = engine.dict_search(&words(&["kata"]), "", 0, None, Some(other.as_slice())).await.unwrap();
        assert!(hidden.lemmas.is_empty());
    }

    #[tokio::test]
    async fn test_huge_chunk_is_an_empty_page() {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        store.insert_lemmas(&[row("kata", 1, "kata")]).await.unwrap();
        let cache = Arc::new(AutoCompleteCache::new(500, Duration::from_secs(3600)));
        let engine = SearchEngine::new(store, cache);

        let result = engine.dict_search(&words(&["kata"]), "", i64::MAX, None, None).await.unwrap();
        assert!(result.lemmas.is_empty());
        assert!(!result.has_more);

        // largest page that still fits is just past the data
        let chunk = i64::MAX / 50;
        let result = engine.dict_search(&words(&["kata"]), "", chunk, None, None).await.unwrap();
        assert!(result.lemmas.is_empty());
    }

    #[tokio::test]
    async fn test_autocomplete_uses_cache() {
        let store = CountingStore {
            words: vec![
                AutoCompleteItem { word: "rumah".to_string(), lang: "id".to_string() },
                AutoCompleteItem { word: "rumput".to_string(), lang: "id".to_string() },
            ],
            ..Default::default()
        };
        let (store, engine) = engine(store);

        let first = engine.autocomplete("ru").await.unwrap();
        assert_eq!(first.len(), 2);
        let second = engine.autocomplete("ru").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(store.prefix_queries.load(Ordering::SeqCst), 1);

        // different key
        engine.autocomplete("rum").await.unwrap();
        assert_eq!(store.prefix_queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_autocomplete_rejects_invalid_prefix() {
        let (store, engine) = engine(CountingStore::default());
        assert!(engine.autocomplete("").await.unwrap().is_empty());
        assert!(engine.autocomplete("   ").await.unwrap().is_empty());
        assert!(engine.autocomplete("ru*").await.unwrap().is_empty());
        assert!(engine.autocomplete("a1").await.unwrap().is_empty());
        assert_eq!(store.prefix_queries.load(Ordering::SeqCst), 0);
    }
}
