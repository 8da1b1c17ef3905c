//! Block decision engine integration tests
//!
//! Exercises the full surface over both store backends: decision
//! precedence, idempotent mutation, recency ordering, and the multicast
//! observation stream.
//!
//! Run with: cargo test --test engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use callblock::store::{MemoryBlockStore, PersistentBlockStore};
use callblock::{
    AlwaysReady, BlockEngine, BlockStore, Channel, EngineError, IncomingEvent, ReadinessGate,
    SharedBlockStore, SpamEvaluator,
};

/// Gate toggled by tests to simulate the host's init/auth phase.
struct HostGate {
    ready: AtomicBool,
}

impl HostGate {
    fn new(ready: bool) -> Arc<Self> {
        Arc::new(Self {
            ready: AtomicBool::new(ready),
        })
    }
}

impl ReadinessGate for HostGate {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

fn engine_over(store: SharedBlockStore) -> BlockEngine {
    BlockEngine::new(store, SpamEvaluator::default(), Arc::new(AlwaysReady))
}

fn memory_engine() -> BlockEngine {
    engine_over(Arc::new(MemoryBlockStore::new()))
}

#[tokio::test]
async fn manual_block_wins_over_everything() {
    let engine = memory_engine();
    engine.add_blocked("+886 912 345 678").await.unwrap();

    // Blocked with auto-spam off and no lookup metadata.
    let bare = IncomingEvent::new("+886-912-345-678", Channel::PhoneCall);
    assert!(engine.should_block(&bare, false).await.unwrap());

    // Blocked even when the lookup says the number is clean.
    let clean = IncomingEvent::new("+886912345678", Channel::PhoneCall)
        .with_spam_info(callblock::SpamInfo::new("+886912345678", 0));
    assert!(engine.should_block(&clean, true).await.unwrap());
}

#[tokio::test]
async fn spam_verdict_gated_by_flag_and_metadata() {
    let engine = memory_engine();
    let number = "+886987654321";

    // High spam level, flag off: not blocked.
    let event = IncomingEvent::new(number, Channel::PhoneCall)
        .with_spam_info(callblock::SpamInfo::new(number, 5));
    assert!(!engine.should_block(&event, false).await.unwrap());

    // Flag on: threshold boundary at the default of 2.
    let at = IncomingEvent::new(number, Channel::PhoneCall)
        .with_spam_info(callblock::SpamInfo::new(number, 2));
    assert!(engine.should_block(&at, true).await.unwrap());

    let below = IncomingEvent::new(number, Channel::PhoneCall)
        .with_spam_info(callblock::SpamInfo::new(number, 1));
    assert!(!engine.should_block(&below, true).await.unwrap());

    // Flag on but no metadata: fail safe.
    let missing = IncomingEvent::new(number, Channel::PhoneCall);
    assert!(!engine.should_block(&missing, true).await.unwrap());
}

#[tokio::test]
async fn add_remove_is_idempotent() {
    let engine = memory_engine();

    engine.add_blocked("+886912345678").await.unwrap();
    engine.add_blocked("+886912345678").await.unwrap();
    assert_eq!(engine.blocked_stats().await.unwrap().total, 1);

    engine.remove_blocked("+886912345678").await.unwrap();
    engine.remove_blocked("+886912345678").await.unwrap();
    assert!(!engine.is_blocked("+886912345678").await.unwrap());
}

#[tokio::test]
async fn readd_moves_entry_to_front_without_duplicating() {
    let store: SharedBlockStore = Arc::new(MemoryBlockStore::new());

    // Drive the store directly with fixed timestamps so ordering is exact.
    let first = callblock::normalize("+886911111111").unwrap();
    let second = callblock::normalize("+886922222222").unwrap();

    store.upsert(&first, Channel::PhoneCall, 100).await.unwrap();
    store.upsert(&second, Channel::PhoneCall, 200).await.unwrap();

    let snapshot = store.snapshot(Channel::PhoneCall).await.unwrap();
    assert_eq!(snapshot[0].number, second);

    // Re-add the older number with a fresher timestamp: front, no duplicate.
    store.upsert(&first, Channel::PhoneCall, 300).await.unwrap();
    let snapshot = store.snapshot(Channel::PhoneCall).await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].number, first);
    assert_eq!(snapshot[0].added_at, 300);
}

#[tokio::test]
async fn observation_delivers_ordered_snapshots_per_mutation() {
    let engine = memory_engine();

    let mut sub = engine.observe_blocked_list().unwrap();
    assert!(sub.recv().await.unwrap().is_empty());

    engine.add_blocked("+886911111111").await.unwrap();
    let after_first = sub.recv().await.unwrap();
    assert_eq!(after_first.len(), 1);

    engine.add_blocked("+886922222222").await.unwrap();
    let after_second = sub.recv().await.unwrap();
    assert_eq!(after_second.len(), 2);
    // Most recent add first.
    assert_eq!(after_second[0].number.as_str(), "+886922222222");

    engine.remove_blocked("+886922222222").await.unwrap();
    let after_remove = sub.recv().await.unwrap();
    assert_eq!(after_remove.len(), 1);
    assert_eq!(after_remove[0].number.as_str(), "+886911111111");
}

#[tokio::test]
async fn every_subscriber_sees_every_snapshot() {
    let engine = memory_engine();

    let mut sub1 = engine.observe_blocked_list().unwrap();
    let mut sub2 = engine.observe_blocked_list().unwrap();
    assert!(sub1.recv().await.unwrap().is_empty());
    assert!(sub2.recv().await.unwrap().is_empty());

    engine.add_blocked("+886911111111").await.unwrap();
    assert_eq!(sub1.recv().await.unwrap().len(), 1);
    assert_eq!(sub2.recv().await.unwrap().len(), 1);

    // Detaching one subscriber leaves the other live.
    drop(sub1);
    engine.add_blocked("+886922222222").await.unwrap();
    assert_eq!(sub2.recv().await.unwrap().len(), 2);
}

#[tokio::test]
async fn late_subscription_starts_from_current_state() {
    let engine = memory_engine();
    engine.add_blocked("+886911111111").await.unwrap();
    engine.add_blocked("+886922222222").await.unwrap();

    let mut sub = engine.observe_blocked_list().unwrap();
    let snapshot = sub.recv().await.unwrap();
    assert_eq!(snapshot.len(), 2);
}

#[tokio::test]
async fn not_ready_gate_blocks_every_operation() {
    let gate = HostGate::new(false);
    let engine = BlockEngine::new(
        Arc::new(MemoryBlockStore::new()),
        SpamEvaluator::default(),
        gate.clone(),
    );

    let event = IncomingEvent::new("+886912345678", Channel::PhoneCall);
    assert!(matches!(
        engine.should_block(&event, true).await,
        Err(EngineError::NotReady)
    ));
    assert!(matches!(
        engine.add_blocked("+886912345678").await,
        Err(EngineError::NotReady)
    ));

    // Completing init/auth unblocks without rebuilding the engine.
    gate.ready.store(true, Ordering::Relaxed);
    engine.add_blocked("+886912345678").await.unwrap();
    assert!(engine.should_block(&event, false).await.unwrap());
}

#[tokio::test]
async fn persistent_backend_full_surface() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = PersistentBlockStore::open(dir.path()).await.unwrap();
        let engine = engine_over(store.clone() as SharedBlockStore);

        engine.add_blocked("+886912345678").await.unwrap();
        assert!(engine.is_blocked("+886 912 345 678").await.unwrap());

        let event = IncomingEvent::new("+886912345678", Channel::PhoneCall);
        assert!(engine.should_block(&event, false).await.unwrap());

        store.flush().unwrap();
    }

    // Reopen: entries and observation state recovered from disk.
    let store = PersistentBlockStore::open(dir.path()).await.unwrap();
    let engine = engine_over(store as SharedBlockStore);

    assert!(engine.is_blocked("+886912345678").await.unwrap());

    let mut sub = engine.observe_blocked_list().unwrap();
    let snapshot = sub.recv().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].number.as_str(), "+886912345678");
}

#[tokio::test]
async fn concurrent_decisions_share_the_engine() {
    let engine = Arc::new(memory_engine());
    engine.add_blocked("+886912345678").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let number = if i % 2 == 0 {
                "+886912345678"
            } else {
                "+886987654321"
            };
            let event = IncomingEvent::new(number, Channel::PhoneCall);
            engine.should_block(&event, false).await.unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let blocked = handle.await.unwrap();
        assert_eq!(blocked, i % 2 == 0);
    }
}
