//! Bounded-concurrency job queue / 有界并发任务队列
//!
//! Jobs start in submission order with at most `concurrency` running at
//! once. A dispatcher task takes jobs off an unbounded channel and acquires
//! a semaphore permit *before* spawning each one, so a later job can never
//! overtake an earlier one. A failing or panicking job only fails itself.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Semaphore};

use super::types::{QueueStats, TaskEvent};
use crate::error::IngestError;

struct QueuedJob {
    id: u64,
    run: BoxFuture<'static, ()>,
}

#[derive(Default)]
struct Counters {
    pending: AtomicUsize,
    running: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// 任务队列（可克隆，共享同一调度器）
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
    counters: Arc<Counters>,
    event_sender: broadcast::Sender<TaskEvent>,
    next_id: Arc<AtomicU64>,
    concurrency: usize,
}

/// Result side of a submitted job / 任务结果句柄
pub struct JobHandle<T> {
    id: u64,
    receiver: oneshot::Receiver<Result<T, IngestError>>,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the job's own result; `QueueClosed` if it never reported one
    pub async fn wait(self) -> Result<T, IngestError> {
        self.receiver.await.unwrap_or(Err(IngestError::QueueClosed))
    }
}

impl TaskQueue {
    /// Spawn the dispatcher; must be called inside a tokio runtime
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let (event_sender, _) = broadcast::channel(256);

        tokio::spawn(dispatch(receiver, Arc::new(Semaphore::new(concurrency))));

        Self {
            sender,
            counters: Arc::new(Counters::default()),
            event_sender,
            next_id: Arc::new(AtomicU64::new(1)),
            concurrency,
        }
    }

    /// 订阅任务事件
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_sender.subscribe()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            concurrency: self.concurrency,
            pending: self.counters.pending.load(Ordering::SeqCst),
            running: self.counters.running.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Queue a job behind every job submitted before it / 提交任务
    pub fn push_task<F, T>(&self, name: &str, job: F) -> JobHandle<T>
    where
        F: Future<Output = Result<T, IngestError>> + Send + 'static,
        T: Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (result_tx, receiver) = oneshot::channel();

        let counters = self.counters.clone();
        let events = self.event_sender.clone();
        let label = name.to_string();
        let name = name.to_string();

        let run = async move {
            counters.pending.fetch_sub(1, Ordering::SeqCst);
            counters.running.fetch_add(1, Ordering::SeqCst);
            let _ = events.send(TaskEvent::Started { id });
            tracing::debug!("Task {} started: {}", id, name);

            let result = match AssertUnwindSafe(job).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(IngestError::JobPanicked(name.clone())),
            };

            counters.running.fetch_sub(1, Ordering::SeqCst);
            match &result {
                Ok(_) => {
                    counters.completed.fetch_add(1, Ordering::SeqCst);
                    let _ = events.send(TaskEvent::Completed { id });
                    tracing::debug!("Task {} completed: {}", id, name);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    let _ = events.send(TaskEvent::Failed { id, error: e.to_string() });
                    tracing::warn!("Task {} failed: {}: {}", id, name, e);
                }
            }

            // caller may have stopped waiting
            let _ = result_tx.send(result);
        }
        .boxed();

        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let _ = self.event_sender.send(TaskEvent::Queued { id, name: label });

        if self.sender.send(QueuedJob { id, run }).is_err() {
            // dispatcher gone; the dropped job resolves the handle to QueueClosed
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            tracing::error!("Task queue closed, dropping task {}", id);
        }

        JobHandle { id, receiver }
    }
}

async fn dispatch(mut receiver: mpsc::UnboundedReceiver<QueuedJob>, slots: Arc<Semaphore>) {
    while let Some(job) = receiver.recv().await {
        let permit = match slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        tracing::trace!("Dispatching task {}", job.id);
        tokio::spawn(async move {
            job.run.await;
            drop(permit);
        });
    }
}
