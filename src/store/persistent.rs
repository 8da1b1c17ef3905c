//! Persistent block-list store using fjall (pure Rust LSM-tree).
//!
//! Durable storage for production use. Entries survive restarts; the
//! observation state is rebuilt from disk on open.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};

use crate::number::CanonicalNumber;

use super::types::{ordered_snapshot, BlockListStats, BlockedEntry, Channel, StoreError};
use super::watch::{BlockListSubscription, BlockListWatch};
use super::BlockStore;

// =============================================================================
// Serializable Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    number: CanonicalNumber,
    channel: Channel,
    added_at_epoch_ms: u64,
}

impl From<PersistedEntry> for BlockedEntry {
    fn from(p: PersistedEntry) -> Self {
        Self {
            number: p.number,
            channel: p.channel,
            added_at: p.added_at_epoch_ms,
        }
    }
}

// =============================================================================
// PersistentBlockStore
// =============================================================================

/// Persistent block-list store backed by a fjall keyspace.
///
/// Each entry is one keyed record, written atomically, so a reader observes
/// either the pre- or post-state of a write and never a torn one. The
/// mutate-then-publish sequence runs under a single writer lock so observers
/// receive snapshots in commit order.
pub struct PersistentBlockStore {
    keyspace: Keyspace,
    entries: PartitionHandle,
    write_lock: Mutex<()>,
    watch: Arc<BlockListWatch>,
}

impl PersistentBlockStore {
    /// Open or create the store at the given path.
    pub async fn open(path: &Path) -> Result<Arc<Self>, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let entries = keyspace.open_partition("blocklist", PartitionCreateOptions::default())?;

        let store = Arc::new(Self {
            keyspace,
            entries,
            write_lock: Mutex::new(()),
            watch: BlockListWatch::new(),
        });

        // Seed the observation state from disk so the first subscription
        // sees recovered entries without waiting for a mutation.
        for channel in Channel::ALL {
            let snapshot = store.scan_channel(channel)?;
            if !snapshot.is_empty() {
                store.watch.publish(channel, snapshot);
            }
        }

        tracing::info!(
            path = %path.display(),
            entries = store.count(),
            "persistent block-list store opened"
        );

        Ok(store)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn count(&self) -> usize {
        self.entries.len().unwrap_or(0)
    }

    fn load(&self, number: &CanonicalNumber) -> Result<Option<BlockedEntry>, StoreError> {
        let Some(value) = self.entries.get(number.as_str().as_bytes())? else {
            return Ok(None);
        };
        let persisted: PersistedEntry = serde_json::from_slice(&value)?;
        Ok(Some(persisted.into()))
    }

    fn scan_channel(&self, channel: Channel) -> Result<Vec<BlockedEntry>, StoreError> {
        let mut all = Vec::new();
        for item in self.entries.iter() {
            let (_key, value) = item?;
            let persisted: PersistedEntry = serde_json::from_slice(&value)?;
            all.push(BlockedEntry::from(persisted));
        }
        Ok(ordered_snapshot(all.iter(), channel))
    }
}

#[async_trait]
impl BlockStore for PersistentBlockStore {
    async fn upsert(
        &self,
        number: &CanonicalNumber,
        channel: Channel,
        added_at: u64,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap();

        let previous = self.load(number)?;

        let persisted = PersistedEntry {
            number: number.clone(),
            channel,
            added_at_epoch_ms: added_at,
        };
        let value = serde_json::to_vec(&persisted)?;
        self.entries.insert(number.as_str().as_bytes(), value)?;

        self.watch.publish(channel, self.scan_channel(channel)?);
        if let Some(prev) = previous {
            if prev.channel != channel {
                self.watch.publish(prev.channel, self.scan_channel(prev.channel)?);
            }
        }

        tracing::debug!(number = %number, channel = channel.name(), "block-list entry upserted");
        Ok(())
    }

    async fn remove(&self, number: &CanonicalNumber) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap();

        let Some(removed) = self.load(number)? else {
            return Ok(());
        };
        self.entries.remove(number.as_str().as_bytes())?;

        self.watch
            .publish(removed.channel, self.scan_channel(removed.channel)?);

        tracing::debug!(number = %number, "block-list entry removed");
        Ok(())
    }

    async fn get(&self, number: &CanonicalNumber) -> Result<Option<BlockedEntry>, StoreError> {
        self.load(number)
    }

    async fn snapshot(&self, channel: Channel) -> Result<Vec<BlockedEntry>, StoreError> {
        self.scan_channel(channel)
    }

    async fn stats(&self) -> Result<BlockListStats, StoreError> {
        let mut stats = BlockListStats::default();
        for item in self.entries.iter() {
            let (_key, value) = item?;
            let persisted: PersistedEntry = serde_json::from_slice(&value)?;
            stats.record(persisted.channel);
        }
        Ok(stats)
    }

    fn observe(&self, channel: Channel) -> BlockListSubscription {
        self.watch.subscribe(channel)
    }
}
