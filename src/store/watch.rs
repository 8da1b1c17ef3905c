//! Multicast observation of the block list.
//!
//! Uses a broadcast channel so any number of subscribers can observe the
//! list independently. Every subscription starts with the current snapshot
//! and then receives a fresh full snapshot after each committed mutation
//! affecting its channel. A slow subscriber lags and resyncs to the latest
//! snapshot; it never blocks the writer or other subscribers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::broadcast;
use tracing::trace;

use super::types::{BlockedEntry, Channel};

/// Broadcast buffer size per watch. Snapshots are self-contained, so a
/// lagged receiver can always skip ahead to the newest one.
const WATCH_CAPACITY: usize = 64;

/// One published snapshot.
#[derive(Debug, Clone)]
struct SnapshotUpdate {
    channel: Channel,
    entries: Arc<Vec<BlockedEntry>>,
}

/// Snapshot broadcaster owned by a store.
///
/// Stores publish under their own write ordering, so snapshots arrive at
/// subscribers in mutation order.
pub(crate) struct BlockListWatch {
    inner: Mutex<WatchInner>,
}

struct WatchInner {
    latest: HashMap<Channel, Arc<Vec<BlockedEntry>>>,
    tx: broadcast::Sender<SnapshotUpdate>,
}

impl BlockListWatch {
    /// Create a new watch.
    pub(crate) fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(WATCH_CAPACITY);
        Arc::new(Self {
            inner: Mutex::new(WatchInner {
                latest: HashMap::new(),
                tx,
            }),
        })
    }

    /// Publish a fresh snapshot for a channel.
    pub(crate) fn publish(&self, channel: Channel, entries: Vec<BlockedEntry>) {
        let mut inner = self.inner.lock().unwrap();
        let entries = Arc::new(entries);
        inner.latest.insert(channel, Arc::clone(&entries));
        // Ignore send errors (no subscribers)
        let _ = inner.tx.send(SnapshotUpdate { channel, entries });
    }

    /// Current snapshot for a channel.
    pub(crate) fn latest(&self, channel: Channel) -> Arc<Vec<BlockedEntry>> {
        let inner = self.inner.lock().unwrap();
        inner.latest.get(&channel).cloned().unwrap_or_default()
    }

    /// Subscribe to a channel's snapshots, starting from the current state.
    pub(crate) fn subscribe(self: &Arc<Self>, channel: Channel) -> BlockListSubscription {
        let inner = self.inner.lock().unwrap();
        BlockListSubscription {
            channel,
            watch: Arc::downgrade(self),
            pending: Some(inner.latest.get(&channel).cloned().unwrap_or_default()),
            rx: inner.tx.subscribe(),
        }
    }

    /// Get number of active subscribers.
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().tx.receiver_count()
    }
}

/// A live subscription to ordered block-list snapshots.
///
/// Dropping the subscription detaches it; other subscribers and the store
/// are unaffected.
pub struct BlockListSubscription {
    channel: Channel,
    watch: Weak<BlockListWatch>,
    pending: Option<Arc<Vec<BlockedEntry>>>,
    rx: broadcast::Receiver<SnapshotUpdate>,
}

impl BlockListSubscription {
    /// Receive the next snapshot.
    ///
    /// The first call yields the snapshot taken at subscription time;
    /// subsequent calls wait for a committed mutation on this channel.
    /// Returns `None` once the owning store has been dropped.
    pub async fn recv(&mut self) -> Option<Arc<Vec<BlockedEntry>>> {
        if let Some(snapshot) = self.pending.take() {
            return Some(snapshot);
        }

        loop {
            match self.rx.recv().await {
                Ok(update) if update.channel == self.channel => return Some(update.entries),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(skipped, "subscriber lagged, resyncing to latest snapshot");
                    let watch = self.watch.upgrade()?;
                    self.rx = self.rx.resubscribe();
                    return Some(watch.latest(self.channel));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The channel this subscription observes.
    pub fn channel(&self) -> Channel {
        self.channel
    }
}
