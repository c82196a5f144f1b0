//! Cache invalidation channel / 缓存失效通知
//!
//! Every component that holds a derived cache receives a subscription at
//! construction and drains it before serving from the cache.

use tokio::sync::broadcast::{self, error::TryRecvError};

/// Process-wide cache event / 缓存事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    InvalidateCaches,
}

#[derive(Clone)]
pub struct CacheEvents {
    sender: broadcast::Sender<CacheEvent>,
}

impl CacheEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> CacheSubscription {
        CacheSubscription { receiver: self.sender.subscribe() }
    }

    /// Broadcast "invalidate caches" / 广播缓存失效
    pub fn invalidate(&self) {
        tracing::debug!("Broadcasting cache invalidation");
        // No subscribers is fine
        let _ = self.sender.send(CacheEvent::InvalidateCaches);
    }
}

impl Default for CacheEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side held by a cache owner / 缓存持有者的订阅
pub struct CacheSubscription {
    receiver: broadcast::Receiver<CacheEvent>,
}

impl CacheSubscription {
    /// Drain pending events; true when the owner must clear its cache.
    /// A lagged receiver missed events, so it also reports true.
    pub fn take_invalidation(&mut self) -> bool {
        let mut invalidated = false;
        loop {
            match self.receiver.try_recv() {
                Ok(CacheEvent::InvalidateCaches) => invalidated = true,
                Err(TryRecvError::Lagged(_)) => invalidated = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        invalidated
    }
}
