//! Block decision engine.
//!
//! Composes the number normalizer, the block-list store and the spam
//! evaluator into one decision surface. The engine is stateless
//! request/response logic over the store; decisions are derived per call
//! and never cached.
//!
//! Decision order for [`BlockEngine::should_block`]:
//! 1. readiness gate (fail with [`EngineError::NotReady`] before any work)
//! 2. normalization (reject invalid input before touching storage)
//! 3. manual block list - a hit short-circuits, spam is never consulted
//! 4. spam verdict, only when the auto-spam flag is on and lookup metadata
//!    is present; missing metadata fails safe to "don't block"

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::number::{normalize, NumberError};
use crate::spam::{SpamEvaluator, SpamInfo};
use crate::store::{
    BlockListStats, BlockListSubscription, Channel, SharedBlockStore, StoreError,
};

// =============================================================================
// Collaborator Interfaces
// =============================================================================

/// External initialization/authentication state.
///
/// Consulted at the top of every public engine operation. The engine does
/// not implement the init/auth flow itself; the host supplies it.
pub trait ReadinessGate: Send + Sync {
    /// Whether the surrounding system is initialized and authenticated.
    fn is_ready(&self) -> bool;
}

/// Gate that is always ready, for hosts without an init/auth phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessGate for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}

// =============================================================================
// Event & Error Types
// =============================================================================

/// An incoming communication event to decide on.
///
/// Ephemeral: constructed per evaluation, owned by the caller, never
/// retained by the engine past one call.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    /// Raw phone number, pre-normalization
    pub phone_number: String,
    /// Channel the event arrived on
    pub channel: Channel,
    /// Lookup metadata, if the caller performed a lookup
    pub spam_info: Option<SpamInfo>,
}

impl IncomingEvent {
    /// Create an event without lookup metadata.
    pub fn new(phone_number: impl Into<String>, channel: Channel) -> Self {
        Self {
            phone_number: phone_number.into(),
            channel,
            spam_info: None,
        }
    }

    /// Attach lookup metadata.
    pub fn with_spam_info(mut self, spam_info: SpamInfo) -> Self {
        self.spam_info = Some(spam_info);
        self
    }
}

/// Engine error types.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine not ready: initialization or authentication incomplete")]
    NotReady,

    #[error("invalid phone number: {0}")]
    InvalidNumber(#[from] NumberError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

// =============================================================================
// BlockEngine
// =============================================================================

/// The block decision engine.
///
/// Constructed with its dependencies injected; lifetime is managed by the
/// host application, not by hidden static state. Cheap to share behind an
/// `Arc`; all operations take `&self`.
pub struct BlockEngine {
    store: SharedBlockStore,
    evaluator: SpamEvaluator,
    gate: Arc<dyn ReadinessGate>,
}

impl BlockEngine {
    /// Create an engine over a store, evaluator and readiness gate.
    pub fn new(
        store: SharedBlockStore,
        evaluator: SpamEvaluator,
        gate: Arc<dyn ReadinessGate>,
    ) -> Self {
        Self {
            store,
            evaluator,
            gate,
        }
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.gate.is_ready() {
            Ok(())
        } else {
            Err(EngineError::NotReady)
        }
    }

    fn now_epoch_ms() -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    /// Decide whether an incoming event should be blocked.
    ///
    /// A manual block always takes precedence and short-circuits: once the
    /// number is found on the list, the spam verdict is never consulted.
    /// Without a manual hit, the spam verdict applies only when
    /// `auto_spam_on` is set and the event carries lookup metadata.
    ///
    /// Pure decision procedure with no persisted side effect; safe to call
    /// concurrently and repeatedly for the same event.
    pub async fn should_block(
        &self,
        event: &IncomingEvent,
        auto_spam_on: bool,
    ) -> Result<bool, EngineError> {
        self.ensure_ready()?;

        let number = normalize(&event.phone_number)?;

        if let Some(entry) = self.store.get(&number).await? {
            if entry.channel == Channel::PhoneCall {
                debug!(number = %number, "blocked by manual list");
                return Ok(true);
            }
        }

        if !auto_spam_on {
            return Ok(false);
        }

        // Fail safe: no lookup metadata means no spam verdict, not an error.
        let spam = event
            .spam_info
            .as_ref()
            .map(|info| self.evaluator.is_spam(info.spam_level))
            .unwrap_or(false);

        if spam {
            debug!(number = %number, "blocked by spam evaluation");
        }
        Ok(spam)
    }

    /// Add a number to the manual block list.
    ///
    /// Idempotent: re-adding refreshes the entry's add time, moving it to
    /// the front of the observed ordering.
    pub async fn add_blocked(&self, phone_number: &str) -> Result<(), EngineError> {
        self.ensure_ready()?;

        let number = normalize(phone_number)?;
        self.store
            .upsert(&number, Channel::PhoneCall, Self::now_epoch_ms())
            .await?;

        info!(number = %number, "number added to block list");
        Ok(())
    }

    /// Remove a number from the manual block list.
    ///
    /// Idempotent: removing an absent number is a no-op.
    pub async fn remove_blocked(&self, phone_number: &str) -> Result<(), EngineError> {
        self.ensure_ready()?;

        let number = normalize(phone_number)?;
        self.store.remove(&number).await?;

        info!(number = %number, "number removed from block list");
        Ok(())
    }

    /// Whether a number is on the manual block list.
    ///
    /// Answers only manual membership; the spam evaluator is never
    /// consulted here.
    pub async fn is_blocked(&self, phone_number: &str) -> Result<bool, EngineError> {
        self.ensure_ready()?;

        let number = normalize(phone_number)?;
        Ok(self.store.contains(&number).await?)
    }

    /// Observe the manual block list for the phone-call channel.
    pub fn observe_blocked_list(&self) -> Result<BlockListSubscription, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.observe(Channel::PhoneCall))
    }

    /// Get block-list statistics.
    pub async fn blocked_stats(&self) -> Result<BlockListStats, EngineError> {
        self.ensure_ready()?;
        Ok(self.store.stats().await?)
    }
}
