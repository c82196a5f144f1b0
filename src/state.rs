use std::sync::Arc;

use taalmap_backend::article::ArticleService;
use taalmap_backend::config::AppConfig;
use taalmap_backend::dict::{AutoCompleteCache, RebuildScheduler, SearchEngine};
use taalmap_backend::events::CacheEvents;
use taalmap_backend::ingest::IngestService;
use taalmap_backend::store::SqliteStore;
use taalmap_backend::task::TaskQueue;
use taalmap_backend::topic::TopicService;

pub struct AppState {
    pub ingest: IngestService<SqliteStore>,
    pub topics: TopicService<SqliteStore>,
    pub articles: ArticleService<SqliteStore>,
    pub search: SearchEngine<SqliteStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire every service around one store; spawns the queue dispatcher and
    /// the rebuild scheduler, so it must run inside the runtime.
    /// 组装所有服务
    pub fn new(store: Arc<SqliteStore>, config: &AppConfig) -> Self {
        let events = CacheEvents::new();

        let cache = Arc::new(AutoCompleteCache::with_events(
            config.search.autocomplete_capacity,
            config.autocomplete_ttl(),
            events.subscribe(),
        ));
        let rebuild = RebuildScheduler::for_word_index(store.clone(), cache.clone(), config.rebuild_delay());
        let queue = TaskQueue::new(config.ingest.concurrency);

        Self {
            ingest: IngestService::new(store.clone(), queue, rebuild, events.clone()),
            topics: TopicService::new(store.clone()),
            articles: ArticleService::with_events(store.clone(), events.subscribe()),
            search: SearchEngine::new(store, cache)
                .with_limits(config.search.chunk_size, config.search.autocomplete_limit),
            max_upload_bytes: config.ingest.max_upload_bytes,
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        self.ingest.queue()
    }
}
