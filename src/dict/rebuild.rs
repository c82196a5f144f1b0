//! Debounced autocomplete index rebuild / 自动补全索引防抖重建
//!
//! States: idle → pending(deadline) → running → idle. Every request while
//! pending pushes the deadline out by the full delay (trailing edge). Requests
//! that arrive while a rebuild runs are folded into one follow-up, which goes
//! through the debounce window again. Two rebuilds never overlap.

use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::cache::AutoCompleteCache;
use crate::error::RebuildError;
use crate::models::AutoCompleteItem;
use crate::store::{LemmaStore, WordStore};

/// The rebuild action run once per quiet window
pub type RebuildFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), RebuildError>> + Send + Sync>;

/// Process-wide debounced rebuild trigger / 重建调度器
#[derive(Clone)]
pub struct RebuildScheduler {
    sender: UnboundedSender<()>,
}

impl RebuildScheduler {
    /// Spawn the scheduler task; must be called inside a tokio runtime
    pub fn new(delay: Duration, rebuild: RebuildFn) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_scheduler(delay, rebuild, receiver));
        Self { sender }
    }

    /// Scheduler that rebuilds the word index from the lemma rows
    pub fn for_word_index<S>(store: Arc<S>, cache: Arc<AutoCompleteCache>, delay: Duration) -> Self
    where
        S: LemmaStore + WordStore + ?Sized + 'static,
    {
        let rebuild: RebuildFn = Arc::new(move || {
            let store = store.clone();
            let cache = cache.clone();
            async move {
                let count = rebuild_word_index(store.as_ref(), &cache).await?;
                tracing::info!("auto-complete collection rebuilt ({} words)", count);
                Ok::<(), RebuildError>(())
            }
            .boxed()
        });
        Self::new(delay, rebuild)
    }

    /// Ask for a rebuild; cheap and never blocks / 请求重建
    pub fn request(&self) {
        if self.sender.send(()).is_err() {
            tracing::warn!("Rebuild scheduler stopped, request dropped");
        }
    }
}

async fn run_scheduler(delay: Duration, rebuild: RebuildFn, mut receiver: UnboundedReceiver<()>) {
    // idle
    while receiver.recv().await.is_some() {
        loop {
            // pending: wait for a quiet window
            let mut closed = false;
            loop {
                match tokio::time::timeout(delay, receiver.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            // running
            tracing::info!("Rebuilding auto-complete index");
            if let Err(e) = rebuild().await {
                tracing::error!("{}", e);
            }

            if closed {
                return;
            }

            let mut requested_while_running = false;
            while receiver.try_recv().is_ok() {
                requested_while_running = true;
            }
            if !requested_while_running {
                break;
            }
            tracing::debug!("Rebuild requested while running, scheduling follow-up");
        }
    }
}

/// Replace the word index with the distinct (word, lang) pairs of all lemmas
///
/// 先清空缓存与索引，再按语言批量写入；失败时索引可能暂时为空
pub async fn rebuild_word_index<S>(store: &S, cache: &AutoCompleteCache) -> Result<usize, RebuildError>
where
    S: LemmaStore + WordStore + ?Sized,
{
    cache.clear();
    store.clear_words().await?;

    let mut items = Vec::new();
    for lang in store.distinct_langs().await? {
        for word in store.distinct_words(&lang).await? {
            items.push(AutoCompleteItem { word, lang: lang.clone() });
        }
    }

    store.insert_words(&items).await?;
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LemmaRow;
    use crate::store::SqliteStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(started: Arc<AtomicUsize>, running: Arc<AtomicUsize>, max: Arc<AtomicUsize>, work: Duration) -> RebuildFn {
        Arc::new(move || {
            let started = started.clone();
            let running = running.clone();
            let max = max.clone();
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(work).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), RebuildError>(())
            }
            .boxed()
        })
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_one_trailing_rebuild() {
        let (started, running, max) = counters();
        let scheduler = RebuildScheduler::new(
            Duration::from_secs(10),
            counting(started.clone(), running, max, Duration::ZERO),
        );

        // requests at t = 0, 2, 4, 6, 8
        for _ in 0..5 {
            scheduler.request();
            tokio::time::sleep(Duration::from_secs(2)).await;
        }

        // t = 17: last request + window not yet reached
        tokio::time::sleep(Duration::from_secs(7)).await;
        assert_eq!(started.load(Ordering::SeqCst), 0);

        // t = 19
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_during_run_queues_one_follow_up() {
        let (started, running, max) = counters();
        let scheduler = RebuildScheduler::new(
            Duration::from_secs(10),
            counting(started.clone(), running, max.clone(), Duration::from_secs(5)),
        );

        scheduler.request();
        // first run spans t = 10..15
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
        scheduler.request();
        scheduler.request();

        // follow-up waits a full window after the first run ends
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(max.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rebuild_word_index() {
        let store = SqliteStore::in_memory().await.unwrap();
        let row = |word: &str, lang: &str| LemmaRow {
            word: word.to_string(),
            lang: lang.to_string(),
            base_word: "x".to_string(),
            base_lang: "nl".to_string(),
            order: 1,
            homonym: 0,
            attr: "k".to_string(),
            text: "x".to_string(),
            group_name: "public".to_string(),
            topic_id: "t1".to_string(),
        };
        store
            .insert_lemmas(&[row("rumah", "id"), row("rumah", "id"), row("huis", "nl")])
            .await
            .unwrap();

        let cache = AutoCompleteCache::new(10, Duration::from_secs(60));
        cache.set("ru", Vec::new());

        let count = rebuild_word_index(&store, &cache).await.unwrap();
        assert_eq!(count, 2);
        assert!(cache.is_empty());

        let found = store.find_words_by_prefix("ru", 10).await.unwrap();
        assert_eq!(found, vec![AutoCompleteItem { word: "rumah".to_string(), lang: "id".to_string() }]);

        // rebuilding again replaces rather than appends
        assert_eq!(rebuild_word_index(&store, &cache).await.unwrap(), 2);
        assert_eq!(store.find_words_by_prefix("", 10).await.unwrap().len(), 2);
    }
}
