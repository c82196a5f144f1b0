//! Upload ingestion pipeline / 上传导入流程
//!
//! Every upload becomes one task queue job:
//! parse → find existing topic → remove old content → upsert topic →
//! insert new content. Steps are not wrapped in a transaction; a failure
//! part-way leaves whatever was already written.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::article::loader as article_loader;
use crate::dict::loader as dict_loader;
use crate::dict::RebuildScheduler;
use crate::error::IngestError;
use crate::events::CacheEvents;
use crate::models::{Topic, TopicKind, TopicSummary};
use crate::store::{Store, TopicStore};
use crate::task::TaskQueue;
use crate::utils::{file_base_name, get_ext};

const DICT_SUFFIX: &str = ".dict.json";
const ARTICLE_SUFFIX: &str = ".md";

/// Error body returned to the uploader / 上传失败信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestFailure {
    pub file_name: String,
    pub message: String,
}

/// Pick the loader by file name / 根据文件名选择加载器
pub fn detect_kind(file_name: &str) -> Result<TopicKind, IngestError> {
    if file_name.ends_with(DICT_SUFFIX) {
        Ok(TopicKind::Dict)
    } else if file_name.ends_with(ARTICLE_SUFFIX) {
        Ok(TopicKind::Article)
    } else {
        Err(IngestError::UnsupportedFileType(get_ext(file_name)))
    }
}

pub struct IngestService<S: ?Sized> {
    store: Arc<S>,
    queue: TaskQueue,
    rebuild: RebuildScheduler,
    events: CacheEvents,
}

impl<S> IngestService<S>
where
    S: Store + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, queue: TaskQueue, rebuild: RebuildScheduler, events: CacheEvents) -> Self {
        Self { store, queue, rebuild, events }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Import one uploaded file / 导入上传文件
    pub async fn ingest(&self, bytes: Vec<u8>, original_name: &str) -> Result<TopicSummary, IngestError> {
        let file_name = file_base_name(original_name);
        let result = self.run_import(bytes, &file_name).await;

        match &result {
            Ok(summary) => tracing::info!("file '{}' uploaded successfully", summary.file_name),
            Err(e) => tracing::error!("error uploading file '{}': {}", file_name, e),
        }
        result
    }

    async fn run_import(&self, bytes: Vec<u8>, file_name: &str) -> Result<TopicSummary, IngestError> {
        let kind = detect_kind(file_name)?;
        let content = String::from_utf8(bytes)
            .map_err(|_| IngestError::Validation(format!("{} is not valid UTF-8", file_name)))?;

        let store = self.store.clone();
        let rebuild = self.rebuild.clone();
        let events = self.events.clone();
        let name = file_name.to_string();

        // Invalidation runs inside the job so it still fires when the
        // uploader goes away before the job ends.
        let handle = self.queue.push_task(file_name, async move {
            let topic = match kind {
                TopicKind::Article => {
                    let upload = article_loader::parse_file(&content, &name)?;
                    let existing = store.find_topic(&name).await?;
                    article_loader::remove_data(store.as_ref(), existing.as_ref()).await?;
                    let topic = upsert(store.as_ref(), &upload.topic).await?;
                    article_loader::create_data(store.as_ref(), &topic, &upload).await?;
                    topic
                }
                TopicKind::Dict => {
                    let upload = dict_loader::parse_file(&content, &name)?;
                    let existing = store.find_topic(&name).await?;
                    dict_loader::remove_data(store.as_ref(), existing.as_ref()).await?;
                    let topic = upsert(store.as_ref(), &upload.topic).await?;
                    dict_loader::create_data(store.as_ref(), &rebuild, &topic, &upload).await?;
                    topic
                }
            };
            events.invalidate();
            Ok(TopicSummary::from(&topic))
        });

        handle.wait().await
    }

    /// Delete a topic and everything it owns / 删除主题及其内容
    pub async fn remove_topic(&self, file_name: &str) -> Result<(), IngestError> {
        let store = self.store.clone();
        let rebuild = self.rebuild.clone();
        let events = self.events.clone();
        let name = file_name.to_string();

        let handle = self.queue.push_task(&format!("remove {}", file_name), async move {
            let topic = store
                .find_topic(&name)
                .await?
                .ok_or_else(|| IngestError::NotFound(name.clone()))?;

            match topic.kind {
                TopicKind::Article => article_loader::remove_data(store.as_ref(), Some(&topic)).await?,
                TopicKind::Dict => {
                    dict_loader::remove_data(store.as_ref(), Some(&topic)).await?;
                    rebuild.request();
                }
            }
            store.delete_topic(&topic.id).await?;
            events.invalidate();
            Ok(())
        });

        handle.wait().await?;
        tracing::info!("removed topic '{}'", file_name);
        Ok(())
    }
}

async fn upsert<S>(store: &S, topic: &Topic) -> Result<Topic, IngestError>
where
    S: Store + ?Sized,
{
    topic.validate().map_err(IngestError::Validation)?;
    Ok(store.upsert_topic(topic).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::AutoCompleteCache;
    use crate::store::{ArticleStore, LemmaQuery, LemmaStore, SqliteStore, TopicStore};
    use crate::task::TaskEvent;
    use std::time::Duration;

    const ARTICLE: &str = "<!-- header -->\n<!-- title: Les Satu -->\n<!-- end-header -->\n## Rumah\n#rumah\n";

    const DICT: &str = r#"{
        "groupName": "public",
        "baseLang": "nl",
        "lemmas": [
            {"base": "rumah", "text": "rumah huis", "words": [{"word": "rumah", "attr": "k", "lang": "id", "order": 1}]}
        ]
    }"#;

    async fn service() -> (Arc<SqliteStore>, IngestService<SqliteStore>, CacheEvents) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let events = CacheEvents::new();
        let cache = Arc::new(AutoCompleteCache::new(500, Duration::from_secs(3600)));
        let rebuild = RebuildScheduler::for_word_index(store.clone(), cache, Duration::from_secs(10));
        let service = IngestService::new(store.clone(), TaskQueue::new(2), rebuild, events.clone());
        (store, service, events)
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("vandale.dict.json").unwrap(), TopicKind::Dict);
        assert_eq!(detect_kind("boek.les1.md").unwrap(), TopicKind::Article);
        assert!(matches!(
            detect_kind("boek.les1.txt"),
            Err(IngestError::UnsupportedFileType(ext)) if ext == "txt"
        ));
        assert!(matches!(detect_kind("data.json"), Err(IngestError::UnsupportedFileType(_))));
    }

    #[tokio::test]
    async fn test_ingest_article_and_reupload() {
        let (store, service, events) = service().await;
        let mut subscription = events.subscribe();

        let summary = service.ingest(ARTICLE.as_bytes().to_vec(), "boek.les1.md").await.unwrap();
        assert_eq!(summary.file_name, "boek.les1.md");
        assert_eq!(summary.kind, TopicKind::Article);
        assert_eq!(summary.title.as_deref(), Some("Les Satu"));
        assert!(subscription.take_invalidation());

        let first = store.find_topic("boek.les1.md").await.unwrap().unwrap();

        let changed = ARTICLE.replace("Les Satu", "Les Een");
        let summary = service.ingest(changed.into_bytes(), "C:\\tmp\\boek.les1.md").await.unwrap();
        assert_eq!(summary.title.as_deref(), Some("Les Een"));
        assert_ne!(summary.hash, first.hash);

        let second = store.find_topic("boek.les1.md").await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
        // old hashtags replaced, not accumulated
        assert_eq!(store.find_hashtags("rumah", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_dict() {
        let (store, service, _) = service().await;
        let summary = service.ingest(DICT.as_bytes().to_vec(), "vandale.dict.json").await.unwrap();
        assert_eq!(summary.kind, TopicKind::Dict);

        let query = LemmaQuery { word: "rumah".to_string(), ..Default::default() };
        assert_eq!(store.find_lemmas(&query).await.unwrap().len(), 1);

        // re-upload replaces the rows
        service.ingest(DICT.as_bytes().to_vec(), "vandale.dict.json").await.unwrap();
        assert_eq!(store.find_lemmas(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ingest_failures() {
        let (store, service, events) = service().await;
        let mut subscription = events.subscribe();

        let err = service.ingest(b"hello".to_vec(), "notes.txt").await.unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFileType(_)));

        let err = service.ingest(b"# no header".to_vec(), "boek.les1.md").await.unwrap_err();
        assert!(matches!(err, IngestError::MalformedHeader(_)));

        let err = service.ingest(ARTICLE.as_bytes().to_vec(), "les1.md").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidFilename(_)));

        let err = service.ingest(vec![0xff, 0xfe], "boek.les1.md").await.unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));

        assert!(!subscription.take_invalidation());
        assert!(store.find_topic("boek.les1.md").await.unwrap().is_none());
        assert_eq!(service.queue().stats().failed, 2);
    }

    async fn wait_for_completion(events: &mut tokio::sync::broadcast::Receiver<TaskEvent>) {
        loop {
            match events.recv().await.unwrap() {
                TaskEvent::Completed { .. } | TaskEvent::Failed { .. } => return,
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_invalidation_survives_dropped_caller() {
        let (store, service, events) = service().await;
        let service = Arc::new(service);
        let mut subscription = events.subscribe();
        let mut task_events = service.queue().subscribe();

        let uploader = {
            let service = service.clone();
            tokio::spawn(async move { service.ingest(ARTICLE.as_bytes().to_vec(), "boek.les1.md").await })
        };
        // job is queued before the caller goes away
        assert!(matches!(task_events.recv().await.unwrap(), TaskEvent::Queued { .. }));
        uploader.abort();

        wait_for_completion(&mut task_events).await;
        assert!(store.find_topic("boek.les1.md").await.unwrap().is_some());
        assert!(subscription.take_invalidation());
    }

    #[tokio::test]
    async fn test_remove_topic_invalidates() {
        let (_, service, events) = service().await;
        service.ingest(ARTICLE.as_bytes().to_vec(), "boek.les1.md").await.unwrap();
        let mut subscription = events.subscribe();

        service.remove_topic("boek.les1.md").await.unwrap();
        assert!(subscription.take_invalidation());
    }

    #[tokio::test]
    async fn test_remove_topic() {
        let (store, service, _) = service().await;
        service.ingest(ARTICLE.as_bytes().to_vec(), "boek.les1.md").await.unwrap();

        service.remove_topic("boek.les1.md").await.unwrap();
        assert!(store.find_topic("boek.les1.md").await.unwrap().is_none());
        assert!(store.find_article("boek.les1.md").await.unwrap().is_none());

        let err = service.remove_topic("boek.les1.md").await.unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)));
    }
}
