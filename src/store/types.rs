//! Types for the block-list store.

use serde::{Deserialize, Serialize};

use crate::number::CanonicalNumber;

/// Communication channel an entry applies to.
///
/// Only `PhoneCall` has blocking behavior today; `Sms` and `Voip` are
/// reserved variants carried through storage for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    PhoneCall,
    Sms,
    Voip,
}

impl Channel {
    /// All channels, in persisted order.
    pub const ALL: [Channel; 3] = [Channel::PhoneCall, Channel::Sms, Channel::Voip];

    /// Get the wire name of this channel.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhoneCall => "PHONE_CALL",
            Self::Sms => "SMS",
            Self::Voip => "VOIP",
        }
    }
}

/// A manually blocked number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedEntry {
    /// Canonical number, the primary key
    pub number: CanonicalNumber,
    /// Channel the block applies to
    pub channel: Channel,
    /// When the entry was (last) added, unix epoch milliseconds
    pub added_at: u64,
}

/// Block-list statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockListStats {
    /// Total entries across all channels
    pub total: u64,
    /// Entries for the phone call channel
    pub phone_call: u64,
    /// Entries for the SMS channel
    pub sms: u64,
    /// Entries for the VoIP channel
    pub voip: u64,
}

impl BlockListStats {
    /// Count an entry toward its channel bucket.
    pub(crate) fn record(&mut self, channel: Channel) {
        self.total += 1;
        match channel {
            Channel::PhoneCall => self.phone_call += 1,
            Channel::Sms => self.sms += 1,
            Channel::Voip => self.voip += 1,
        }
    }
}

/// Build the ordered snapshot for one channel.
///
/// Most recently added first; ties broken by number ascending so the
/// ordering is deterministic for equal timestamps.
pub(crate) fn ordered_snapshot<'a>(
    entries: impl Iterator<Item = &'a BlockedEntry>,
    channel: Channel,
) -> Vec<BlockedEntry> {
    let mut snapshot: Vec<BlockedEntry> =
        entries.filter(|e| e.channel == channel).cloned().collect();
    snapshot.sort_by(|a, b| {
        b.added_at
            .cmp(&a.added_at)
            .then_with(|| a.number.cmp(&b.number))
    });
    snapshot
}

/// Store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage engine error: {0}")]
    Engine(#[from] fjall::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
