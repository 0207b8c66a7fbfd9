//! The giver → receiver assignment produced by one matcher run.
//!
//! An assignment is created atomically and never edited in place: a new
//! draw replaces it as a whole. Checking it against a roster and an
//! exclusion set lives in `giftmatch-matchcore`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// A mapping from giver id to receiver id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    pairs: BTreeMap<ParticipantId, ParticipantId>,
}

impl Assignment {
    /// Build from `(giver, receiver)` pairs. A later pair for the same
    /// giver overwrites an earlier one; callers verify before trusting it.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ParticipantId, ParticipantId)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Who `giver` buys for.
    #[must_use]
    pub fn receiver_of(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.pairs.get(&giver).copied()
    }

    /// Who buys for `receiver`.
    #[must_use]
    pub fn giver_of(&self, receiver: ParticipantId) -> Option<ParticipantId> {
        self.pairs
            .iter()
            .find_map(|(giver, r)| (*r == receiver).then_some(*giver))
    }

    /// `(giver, receiver)` pairs in giver-id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.pairs.iter().map(|(g, r)| (*g, *r))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn involves(&self, id: ParticipantId) -> bool {
        self.pairs.contains_key(&id) || self.pairs.values().any(|r| *r == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_both_directions() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let c = ParticipantId::new();
        let assignment = Assignment::from_pairs([(a, b), (b, c), (c, a)]);
        assert_eq!(assignment.receiver_of(a), Some(b));
        assert_eq!(assignment.giver_of(a), Some(c));
        assert_eq!(assignment.len(), 3);
        assert!(assignment.involves(b));
        assert!(!assignment.involves(ParticipantId::new()));
    }

    #[test]
    fn serde_roundtrip_preserves_pairs() {
        let a = ParticipantId::new();
        let b = ParticipantId::new();
        let c = ParticipantId::new();
        let assignment = Assignment::from_pairs([(a, c), (b, a), (c, b)]);
        let json = serde_json::to_string(&assignment).unwrap();
        let back: Assignment = serde_json::from_str(&json).unwrap();
        assert_eq!(assignment, back);
    }
}
