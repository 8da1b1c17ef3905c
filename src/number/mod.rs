//! Phone number normalization.
//!
//! Every number entering the engine is reduced to a canonical form before it
//! touches storage: a single optional leading `+` followed by the digit
//! sequence, all other formatting stripped. The canonical form is the only
//! key the block list is indexed by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A phone number in canonical form.
///
/// Produced by [`normalize`]; normalization is idempotent, so a
/// `CanonicalNumber` fed back through [`normalize`] yields itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalNumber(String);

impl CanonicalNumber {
    /// The canonical textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalization error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("phone number {0:?} contains no digits")]
    NoDigits(String),
}

/// Normalize a raw phone number to its canonical form.
///
/// Keeps a single leading `+` and the digit sequence; spaces, hyphens,
/// parentheses and every other character are dropped. Fails if nothing
/// remains but formatting.
pub fn normalize(raw: &str) -> Result<CanonicalNumber, NumberError> {
    let trimmed = raw.trim();

    let mut canonical = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        canonical.push('+');
    }
    canonical.extend(trimmed.chars().filter(|c| c.is_ascii_digit()));

    if !canonical.bytes().any(|b| b.is_ascii_digit()) {
        return Err(NumberError::NoDigits(raw.to_string()));
    }

    Ok(CanonicalNumber(canonical))
}
