//! Exclusion constraints.
//!
//! An exclusion forbids two participants from being matched to each other
//! in either direction. Pairs are stored in canonical (sorted) order so
//! that `(A, B)` and `(B, A)` are the same value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{GiftmatchError, ParticipantId, Result};

/// A symmetric pair of distinct participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "(ParticipantId, ParticipantId)", into = "(ParticipantId, ParticipantId)")]
pub struct UnorderedPair {
    low: ParticipantId,
    high: ParticipantId,
}

impl UnorderedPair {
    /// Build a canonical pair.
    ///
    /// # Errors
    /// Returns [`GiftmatchError::SelfExclusion`] if `a == b`.
    pub fn new(a: ParticipantId, b: ParticipantId) -> Result<Self> {
        if a == b {
            return Err(GiftmatchError::SelfExclusion(a));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    #[must_use]
    pub fn members(&self) -> (ParticipantId, ParticipantId) {
        (self.low, self.high)
    }

    #[must_use]
    pub fn involves(&self, id: ParticipantId) -> bool {
        self.low == id || self.high == id
    }
}

impl TryFrom<(ParticipantId, ParticipantId)> for UnorderedPair {
    type Error = GiftmatchError;

    fn try_from((a, b): (ParticipantId, ParticipantId)) -> Result<Self> {
        Self::new(a, b)
    }
}

impl From<UnorderedPair> for (ParticipantId, ParticipantId) {
    fn from(pair: UnorderedPair) -> Self {
        (pair.low, pair.high)
    }
}

/// The set of forbidden pairs for one exchange.
///
/// Duplicate pairs are impossible by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet {
    pairs: BTreeSet<UnorderedPair>,
}

impl ExclusionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair.
    ///
    /// # Errors
    /// - `SelfExclusion` if `a == b`
    /// - `DuplicateExclusion` if the unordered pair is already present
    pub fn insert(&mut self, a: ParticipantId, b: ParticipantId) -> Result<UnorderedPair> {
        let pair = UnorderedPair::new(a, b)?;
        if !self.pairs.insert(pair) {
            return Err(GiftmatchError::DuplicateExclusion(a, b));
        }
        Ok(pair)
    }

    /// Remove a pair in either orientation. Returns whether it was present.
    pub fn remove(&mut self, a: ParticipantId, b: ParticipantId) -> bool {
        UnorderedPair::new(a, b).is_ok_and(|pair| self.pairs.remove(&pair))
    }

    /// Drop every pair involving `id`. Returns how many were removed.
    pub fn remove_involving(&mut self, id: ParticipantId) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|pair| !pair.involves(id));
        before - self.pairs.len()
    }

    /// Whether `a` and `b` may not be matched (either direction).
    #[must_use]
    pub fn forbids(&self, a: ParticipantId, b: ParticipantId) -> bool {
        UnorderedPair::new(a, b).is_ok_and(|pair| self.pairs.contains(&pair))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnorderedPair> {
        self.pairs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<UnorderedPair> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = UnorderedPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
