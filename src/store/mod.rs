//! Block-list storage.
//!
//! The manual block list is a persisted mapping from canonical phone number
//! to a [`BlockedEntry`], managed through the [`BlockStore`] trait:
//! - **Mutation**: idempotent upsert/remove keyed by canonical number
//! - **Lookup**: point query by key
//! - **Observation**: multicast ordered snapshot stream per channel
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  BlockStore                  │
//! │  ┌─────────┐  ┌────────┐  ┌───────────────┐  │
//! │  │ Entries │  │ Lookup │  │  Observation  │  │
//! │  └─────────┘  └────────┘  └───────────────┘  │
//! └──────────────────────────────────────────────┘
//!                      │
//!           ┌──────────┴──────────┐
//!           ▼                     ▼
//!     ┌──────────┐          ┌──────────┐
//!     │  Memory  │          │  Fjall   │
//!     │  (dev)   │          │  (prod)  │
//!     └──────────┘          └──────────┘
//! ```
//!
//! # Implementations
//!
//! - [`MemoryBlockStore`]: In-memory, volatile - for development/testing
//! - [`PersistentBlockStore`]: Fjall-backed, durable - for production

mod factory;
mod memory;
mod persistent;
pub mod types;
mod watch;

pub use factory::create_store;
pub use memory::MemoryBlockStore;
pub use persistent::PersistentBlockStore;
pub use types::{BlockListStats, BlockedEntry, Channel, StoreError};
pub use watch::BlockListSubscription;

use std::sync::Arc;

use async_trait::async_trait;

use crate::number::CanonicalNumber;

// =============================================================================
// BlockStore Trait
// =============================================================================

/// Keyed block-list storage.
///
/// One entry per canonical number. All implementations must be thread-safe
/// (`Send + Sync`) and must linearize writes to the same key: concurrent
/// upsert/remove calls for one number settle on one of the two outcomes,
/// never a field-level mix. Operations on different keys are independent.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Insert or replace the entry for a number, setting its add time.
    ///
    /// Re-adding an already-present number refreshes `added_at`, which moves
    /// the entry to the front of the observed ordering.
    async fn upsert(
        &self,
        number: &CanonicalNumber,
        channel: Channel,
        added_at: u64,
    ) -> Result<(), StoreError>;

    /// Delete the entry for a number. Absence is not an error.
    async fn remove(&self, number: &CanonicalNumber) -> Result<(), StoreError>;

    /// Get the entry for a number.
    async fn get(&self, number: &CanonicalNumber) -> Result<Option<BlockedEntry>, StoreError>;

    /// Whether an entry exists for a number.
    async fn contains(&self, number: &CanonicalNumber) -> Result<bool, StoreError> {
        Ok(self.get(number).await?.is_some())
    }

    /// Ordered listing for a channel: `added_at` descending, ties broken by
    /// number ascending.
    async fn snapshot(&self, channel: Channel) -> Result<Vec<BlockedEntry>, StoreError>;

    /// Get block-list statistics.
    async fn stats(&self) -> Result<BlockListStats, StoreError>;

    /// Observe a channel's ordered snapshots.
    ///
    /// Every subscription immediately receives the current snapshot, then a
    /// fresh snapshot after each committed mutation affecting the channel.
    /// Dropping the subscription detaches it without affecting other
    /// subscribers or stored state.
    fn observe(&self, channel: Channel) -> BlockListSubscription;
}

/// Shared block-store handle.
pub type SharedBlockStore = Arc<dyn BlockStore>;
