//! # Reveal records: the one-time disclosure primitive
//!
//! One record is published per participant who has an email. It carries
//! everything the participant needs to see about their match, plus the
//! `revealed` flag that makes the disclosure at-most-once.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────────┐  first reveal  ┌──────────┐
//!   │ UNREVEALED ├───────────────▶│ REVEALED │
//!   └────────────┘                └──────────┘
//! ```
//!
//! `REVEALED` is terminal for the life of the event.

use serde::{Deserialize, Serialize};

use crate::{BudgetRange, ParticipantId};

/// Lifecycle state of a reveal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevealState {
    /// Published, not yet seen by its participant.
    Unrevealed,
    /// Seen. **Irreversible.**
    Revealed,
}

impl RevealState {
    /// Can this record transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Unrevealed, Self::Revealed))
    }
}

impl std::fmt::Display for RevealState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrevealed => write!(f, "UNREVEALED"),
            Self::Revealed => write!(f, "REVEALED"),
        }
    }
}

/// What one participant sees when they look up their match.
///
/// Field names are camelCase on the wire so stored documents read the same
/// from any client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRecord {
    /// The giver this record belongs to.
    pub participant_id: ParticipantId,
    pub giver_name: String,
    pub match_name: String,
    #[serde(default)]
    pub match_wishlist: String,
    pub budget: BudgetRange,
    pub revealed: bool,
}

impl RevealRecord {
    #[must_use]
    pub fn state(&self) -> RevealState {
        if self.revealed {
            RevealState::Revealed
        } else {
            RevealState::Unrevealed
        }
    }
}

/// Result of a `reveal` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// This call performed the one-way flip. The record is returned with
    /// `revealed == true`.
    Revealed(RevealRecord),
    /// Somebody (possibly this participant on another device) already
    /// revealed this record. The match details are still returned, but the
    /// first-time ceremony must not repeat.
    AlreadyRevealed(RevealRecord),
    /// No record for this email under this event. Identical for "never a
    /// participant" and "typo".
    NotFound,
}

impl RevealOutcome {
    /// Whether this call was the first reveal.
    #[must_use]
    pub fn is_first_reveal(&self) -> bool {
        matches!(self, Self::Revealed(_))
    }

    #[must_use]
    pub fn record(&self) -> Option<&RevealRecord> {
        match self {
            Self::Revealed(record) | Self::AlreadyRevealed(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

/// Counts for the organizer's status board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealStatus {
    /// Published records.
    pub total: usize,
    /// Records already revealed.
    pub revealed: usize,
}

impl RevealStatus {
    #[must_use]
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.revealed)
    }
}
