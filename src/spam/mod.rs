//! Spam severity evaluation.
//!
//! The evaluator maps the spam level reported by the external lookup
//! provider to a boolean verdict. It is pure and total: no I/O, no failure
//! mode, safe to call from any thread.

use serde::{Deserialize, Serialize};

/// Default minimum spam level treated as spam.
pub const DEFAULT_SPAM_THRESHOLD: u32 = 2;

/// Number metadata produced by the external lookup provider.
///
/// Opaque to the engine except for `spam_level`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamInfo {
    /// The number the lookup was performed for
    pub number: String,
    /// Display name reported by the provider
    pub display_name: String,
    /// Business category label
    pub business_category: String,
    /// Spam category label
    pub spam_category: String,
    /// Spam severity score
    pub spam_level: u32,
}

impl SpamInfo {
    /// Create spam info for a number with the given severity.
    pub fn new(number: impl Into<String>, spam_level: u32) -> Self {
        Self {
            number: number.into(),
            spam_level,
            ..Default::default()
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the business category.
    pub fn with_business_category(mut self, category: impl Into<String>) -> Self {
        self.business_category = category.into();
        self
    }

    /// Set the spam category.
    pub fn with_spam_category(mut self, category: impl Into<String>) -> Self {
        self.spam_category = category.into();
        self
    }
}

/// Threshold-based spam verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpamEvaluator {
    threshold: u32,
}

impl SpamEvaluator {
    /// Create an evaluator with a custom threshold.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether the given spam level qualifies as spam.
    pub fn is_spam(&self, spam_level: u32) -> bool {
        spam_level >= self.threshold
    }
}

impl Default for SpamEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_SPAM_THRESHOLD)
    }
}
