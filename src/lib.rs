//! Block decision engine for incoming communication events.
//!
//! Combines a user-maintained manual block list with an optional automatic
//! spam-severity evaluation to decide whether an incoming event should be
//! blocked. The manual list always wins: a listed number is blocked no
//! matter what the spam evaluation would say.
//!
//! # Components
//!
//! - [`number`]: phone-number normalization to the canonical storage key
//! - [`store`]: the persisted block list - keyed mutation, point lookup and
//!   a multicast ordered snapshot stream
//! - [`spam`]: threshold-based spam verdict over lookup metadata
//! - [`engine`]: the decision procedure composing the above
//! - [`config`]: YAML configuration for embedding hosts
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use callblock::{AlwaysReady, BlockEngine, Channel, IncomingEvent, SpamEvaluator};
//! use callblock::store::MemoryBlockStore;
//!
//! # async fn run() -> Result<(), callblock::EngineError> {
//! let engine = BlockEngine::new(
//!     Arc::new(MemoryBlockStore::new()),
//!     SpamEvaluator::default(),
//!     Arc::new(AlwaysReady),
//! );
//!
//! engine.add_blocked("+886-912-345-678").await?;
//!
//! let event = IncomingEvent::new("+886912345678", Channel::PhoneCall);
//! assert!(engine.should_block(&event, false).await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod number;
pub mod spam;
pub mod store;

pub use config::Config;
pub use engine::{AlwaysReady, BlockEngine, EngineError, IncomingEvent, ReadinessGate};
pub use number::{normalize, CanonicalNumber, NumberError};
pub use spam::{SpamEvaluator, SpamInfo, DEFAULT_SPAM_THRESHOLD};
pub use store::{
    create_store, BlockListStats, BlockListSubscription, BlockStore, BlockedEntry, Channel,
    SharedBlockStore, StoreError,
};
