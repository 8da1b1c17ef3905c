//! In-memory block-list store.
//!
//! Volatile storage for development and testing. All entries are lost on
//! restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::number::CanonicalNumber;

use super::types::{ordered_snapshot, BlockListStats, BlockedEntry, Channel, StoreError};
use super::watch::{BlockListSubscription, BlockListWatch};
use super::BlockStore;

/// In-memory block-list store.
///
/// Thread-safe using a single `RwLock` over the entry map, which linearizes
/// writes to the same key and keeps each entry write whole.
pub struct MemoryBlockStore {
    entries: RwLock<HashMap<CanonicalNumber, BlockedEntry>>,
    watch: Arc<BlockListWatch>,
}

impl MemoryBlockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        debug!("creating in-memory block-list store");
        Self {
            entries: RwLock::new(HashMap::new()),
            watch: BlockListWatch::new(),
        }
    }
}

impl Default for MemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn upsert(
        &self,
        number: &CanonicalNumber,
        channel: Channel,
        added_at: u64,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap();
        let previous = entries.insert(
            number.clone(),
            BlockedEntry {
                number: number.clone(),
                channel,
                added_at,
            },
        );

        // Publish while the write lock is held so snapshots are delivered
        // in mutation order.
        self.watch
            .publish(channel, ordered_snapshot(entries.values(), channel));
        if let Some(prev) = previous {
            if prev.channel != channel {
                self.watch
                    .publish(prev.channel, ordered_snapshot(entries.values(), prev.channel));
            }
        }

        debug!(number = %number, channel = channel.name(), "block-list entry upserted");
        Ok(())
    }

    async fn remove(&self, number: &CanonicalNumber) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap();
        if let Some(removed) = entries.remove(number) {
            self.watch.publish(
                removed.channel,
                ordered_snapshot(entries.values(), removed.channel),
            );
            debug!(number = %number, "block-list entry removed");
        }
        Ok(())
    }

    async fn get(&self, number: &CanonicalNumber) -> Result<Option<BlockedEntry>, StoreError> {
        Ok(self.entries.read().unwrap().get(number).cloned())
    }

    async fn snapshot(&self, channel: Channel) -> Result<Vec<BlockedEntry>, StoreError> {
        let entries = self.entries.read().unwrap();
        Ok(ordered_snapshot(entries.values(), channel))
    }

    async fn stats(&self) -> Result<BlockListStats, StoreError> {
        let entries = self.entries.read().unwrap();
        let mut stats = BlockListStats::default();
        for entry in entries.values() {
            stats.record(entry.channel);
        }
        Ok(stats)
    }

    fn observe(&self, channel: Channel) -> BlockListSubscription {
        self.watch.subscribe(channel)
    }
}
