//! Owned session state for one gift exchange.
//!
//! [`ExchangeState`] holds the organizer's roster, exclusions, event
//! details, the current draw, and the local reveal list. It is passed
//! around by reference; every mutation goes through a validated method
//! here, the draw service, or the local reveal ledger.
//!
//! The whole value serializes to JSON so it can be exported, saved
//! between sessions, and imported again. Imports are re-validated.

use std::collections::BTreeSet;

use giftmatch_matchcore::verify_assignment;
use giftmatch_types::{
    Assignment, EventDetails, EventId, ExclusionSet, GiftmatchError, Participant, ParticipantId,
    Result, UnorderedPair, normalize_email,
};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_exclusion, validate_new_participant, validate_roster};

/// Everything one organizer session knows about an exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeState {
    event: EventDetails,
    participants: Vec<Participant>,
    exclusions: ExclusionSet,
    assignment: Option<Assignment>,
    event_id: Option<EventId>,
    /// Participants who already saw their match through the local ledger.
    revealed_participants: BTreeSet<ParticipantId>,
}

impl ExchangeState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors -----------------------------------------------------------

    #[must_use]
    pub fn event(&self) -> &EventDetails {
        &self.event
    }

    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Find a participant by email, normalizing `raw` first.
    #[must_use]
    pub fn participant_by_email(&self, raw: &str) -> Option<&Participant> {
        let wanted = normalize_email(raw);
        self.participants
            .iter()
            .find(|p| p.email.as_ref().is_some_and(|e| e.as_str() == wanted))
    }

    #[must_use]
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    #[must_use]
    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.assignment.is_some()
    }

    #[must_use]
    pub fn is_revealed(&self, id: ParticipantId) -> bool {
        self.revealed_participants.contains(&id)
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed_participants.len()
    }

    // -- Event ----------------------------------------------------------------

    /// Replace the event details.
    ///
    /// # Errors
    /// `EmptyField` if the organizer name is blank. The budget range was
    /// already validated when it was built.
    pub fn set_event(&mut self, details: EventDetails) -> Result<()> {
        self.event = details.normalized()?;
        Ok(())
    }

    // -- Roster ---------------------------------------------------------------

    /// Add a participant from raw organizer input.
    ///
    /// A current draw no longer covers the roster afterwards and is
    /// discarded.
    ///
    /// # Errors
    /// Any validation error from [`Participant::new`] or
    /// [`validate_new_participant`]; the roster is unchanged on error.
    pub fn add_participant(
        &mut self,
        name: &str,
        email: Option<&str>,
        wishlist: &str,
    ) -> Result<ParticipantId> {
        let participant = Participant::new(name, email, wishlist)?;
        validate_new_participant(&self.participants, &participant)?;
        let id = participant.id;
        tracing::debug!(participant = %id, name = %participant.name, "Participant added");
        self.participants.push(participant);
        if self.assignment.is_some() {
            tracing::warn!(participant = %id, "Roster grew after the draw; draw discarded");
            self.clear_draw();
        }
        Ok(id)
    }

    /// Remove a participant and every exclusion that mentions them.
    ///
    /// If the current draw involves them it no longer covers the roster,
    /// so the draw and the local reveal list are discarded.
    ///
    /// # Errors
    /// `UnknownParticipant` if `id` is not on the roster.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(GiftmatchError::UnknownParticipant(id))?;
        let removed = self.participants.remove(index);
        let dropped = self.exclusions.remove_involving(id);

        if self.assignment.as_ref().is_some_and(|a| a.involves(id)) {
            tracing::warn!(
                participant = %id,
                "Removed participant was part of the current draw; draw discarded"
            );
            self.clear_draw();
        }
        self.revealed_participants.remove(&id);

        tracing::debug!(participant = %id, exclusions_dropped = dropped, "Participant removed");
        Ok(removed)
    }

    // -- Exclusions -----------------------------------------------------------

    /// Forbid `a` and `b` from being matched to each other.
    ///
    /// A current draw that pairs them is discarded.
    ///
    /// # Errors
    /// See [`validate_exclusion`].
    pub fn add_exclusion(&mut self, a: ParticipantId, b: ParticipantId) -> Result<UnorderedPair> {
        validate_exclusion(&self.participants, &self.exclusions, a, b)?;
        let pair = self.exclusions.insert(a, b)?;

        let violated = self
            .assignment
            .as_ref()
            .is_some_and(|asg| asg.receiver_of(a) == Some(b) || asg.receiver_of(b) == Some(a));
        if violated {
            tracing::warn!(%a, %b, "New exclusion contradicts the current draw; draw discarded");
            self.clear_draw();
        }
        Ok(pair)
    }

    /// Remove an exclusion in either orientation. Returns whether it existed.
    pub fn remove_exclusion(&mut self, a: ParticipantId, b: ParticipantId) -> bool {
        self.exclusions.remove(a, b)
    }

    // -- Draw & reveal bookkeeping --------------------------------------------

    /// Install a verified assignment as the current draw.
    ///
    /// Keeps the existing event id if there is one, so that re-publishing
    /// replaces the records of the same event. Starts a fresh local reveal
    /// list either way.
    pub(crate) fn install_draw(&mut self, assignment: Assignment, fresh_event_id: EventId) -> EventId {
        let event_id = self.event_id.get_or_insert(fresh_event_id).clone();
        self.assignment = Some(assignment);
        self.revealed_participants.clear();
        event_id
    }

    fn clear_draw(&mut self) {
        self.assignment = None;
        self.revealed_participants.clear();
    }

    /// Record a local reveal. Returns `true` if this was the first one.
    pub fn mark_revealed(&mut self, id: ParticipantId) -> bool {
        self.revealed_participants.insert(id)
    }

    /// Forget everything (new exchange).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // -- Snapshot -------------------------------------------------------------

    /// Serialize the whole session.
    ///
    /// # Errors
    /// `Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and re-validate a saved session.
    ///
    /// # Errors
    /// - `Serialization` on malformed JSON
    /// - any roster validation error
    /// - `InvalidAssignment` if the saved draw breaks an invariant
    /// - `UnknownParticipant` if the reveal list names a stranger
    pub fn from_json(json: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Check every invariant of the session.
    ///
    /// # Errors
    /// See [`Self::from_json`].
    pub fn validate(&self) -> Result<()> {
        validate_roster(&self.participants, &self.exclusions)?;
        if let Some(assignment) = &self.assignment {
            verify_assignment(assignment, &self.participants, &self.exclusions)?;
        }
        if let Some(stranger) = self
            .revealed_participants
            .iter()
            .find(|id| self.participant(**id).is_none())
        {
            return Err(GiftmatchError::UnknownParticipant(*stranger));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use giftmatch_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn state_with(names: &[&str]) -> (ExchangeState, Vec<ParticipantId>) {
        let mut state = ExchangeState::new();
        let ids = names
            .iter()
            .map(|n| {
                let email = format!("{}@example.com", n.to_lowercase());
                state.add_participant(n, Some(&email), "").unwrap()
            })
            .collect();
        (state, ids)
    }

    fn cycle(ids: &[ParticipantId]) -> Assignment {
        Assignment::from_pairs(ids.iter().copied().zip(ids.iter().copied().cycle().skip(1)))
    }

    #[test]
    fn add_participant_rejects_duplicates_without_mutation() {
        let (mut state, _) = state_with(&["Alice"]);
        assert!(state.add_participant("alice", None, "").is_err());
        assert!(state.add_participant("Alicia", Some("ALICE@example.com"), "").is_err());
        assert!(state.add_participant("Al", Some("not-an-email"), "").is_err());
        assert_eq!(state.participants().len(), 1);
    }

    #[test]
    fn email_with_path_separator_is_rejected() {
        let (mut state, _) = state_with(&["Alice"]);
        let err = state
            .add_participant("Ann", Some("ann/sales@example.com"), "")
            .unwrap_err();
        assert!(matches!(err, GiftmatchError::InvalidEmail(_)));
        assert!(err.is_validation());
        assert_eq!(state.participants().len(), 1);
    }

    #[test]
    fn lookup_by_email_normalizes() {
        let (state, ids) = state_with(&["Alice", "Bob"]);
        assert_eq!(
            state.participant_by_email("  BOB@Example.com ").map(|p| p.id),
            Some(ids[1])
        );
        assert!(state.participant_by_email("carol@example.com").is_none());
    }

    #[test]
    fn remove_participant_cascades_exclusions() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        state.add_exclusion(ids[0], ids[1]).unwrap();
        state.add_exclusion(ids[2], ids[0]).unwrap();
        state.add_exclusion(ids[1], ids[2]).unwrap();

        let removed = state.remove_participant(ids[0]).unwrap();
        assert_eq!(removed.name, "A");
        assert_eq!(state.exclusions().len(), 1);
        assert!(state.exclusions().forbids(ids[1], ids[2]));
    }

    #[test]
    fn remove_unknown_participant_fails() {
        let (mut state, _) = state_with(&["A"]);
        let err = state.remove_participant(ParticipantId::new()).unwrap_err();
        assert!(matches!(err, GiftmatchError::UnknownParticipant(_)));
    }

    #[test]
    fn removing_a_matched_participant_discards_the_draw() {
        let (mut state, ids) = state_with(&["A", "B", "C", "D"]);
        state.install_draw(cycle(&ids), EventId::new("ss_test_1"));
        state.mark_revealed(ids[1]);
        state.remove_participant(ids[3]).unwrap();
        assert!(state.assignment().is_none());
        assert_eq!(state.revealed_count(), 0);
    }

    #[test]
    fn adding_a_participant_discards_the_draw() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        state.install_draw(cycle(&ids), EventId::new("ss_test_1"));
        state.add_participant("D", None, "").unwrap();
        assert!(!state.is_generated());
        assert_eq!(state.event_id().map(EventId::as_str), Some("ss_test_1"));
    }

    #[test]
    fn contradicting_exclusion_discards_the_draw() {
        let (mut state, ids) = state_with(&["A", "B", "C", "D"]);
        state.install_draw(cycle(&ids), EventId::new("ss_test_1"));
        // cycle pairs A -> B
        state.add_exclusion(ids[1], ids[0]).unwrap();
        assert!(!state.is_generated());
    }

    #[test]
    fn unrelated_exclusion_keeps_the_draw() {
        let (mut state, ids) = state_with(&["A", "B", "C", "D"]);
        state.install_draw(cycle(&ids), EventId::new("ss_test_1"));
        // cycle never pairs A with C
        state.add_exclusion(ids[0], ids[2]).unwrap();
        assert!(state.is_generated());
    }

    #[test]
    fn install_draw_keeps_event_id_and_resets_reveals() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        let first = state.install_draw(cycle(&ids), EventId::new("ss_first"));
        state.mark_revealed(ids[0]);
        let second = state.install_draw(cycle(&ids), EventId::new("ss_second"));
        assert_eq!(first, second);
        assert_eq!(second.as_str(), "ss_first");
        assert!(!state.is_revealed(ids[0]));
    }

    #[test]
    fn mark_revealed_reports_first_time() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        assert!(state.mark_revealed(ids[0]));
        assert!(!state.mark_revealed(ids[0]));
        assert!(state.is_revealed(ids[0]));
    }

    #[test]
    fn set_event_normalizes() {
        let mut state = ExchangeState::new();
        state
            .set_event(EventDetails {
                organizer_name: "  HR ".into(),
                budget: BudgetRange::new(Decimal::new(1000, 0), Decimal::new(1500, 0)).unwrap(),
                ..EventDetails::default()
            })
            .unwrap();
        assert_eq!(state.event().organizer_name, "HR");
        assert!(state.set_event(EventDetails::default()).is_err());
        assert_eq!(state.event().organizer_name, "HR");
    }

    #[test]
    fn snapshot_roundtrip_revalidates() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        state.install_draw(cycle(&ids), EventId::new("ss_snap"));
        state.mark_revealed(ids[2]);

        let json = state.to_json().unwrap();
        assert!(json.contains("revealed_participants"));
        let back = ExchangeState::from_json(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn snapshot_with_broken_draw_is_rejected() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        state.install_draw(
            Assignment::from_pairs([(ids[0], ids[0]), (ids[1], ids[2]), (ids[2], ids[1])]),
            EventId::new("ss_bad"),
        );
        let json = state.to_json().unwrap();
        let err = ExchangeState::from_json(&json).unwrap_err();
        assert!(matches!(err, GiftmatchError::InvalidAssignment { .. }));
    }

    #[test]
    fn empty_snapshot_loads() {
        let state = ExchangeState::from_json("{}").unwrap();
        assert!(state.participants().is_empty());
        assert!(state.event_id().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let (mut state, ids) = state_with(&["A", "B", "C"]);
        state.install_draw(cycle(&ids), EventId::new("ss_reset"));
        state.reset();
        assert_eq!(state, ExchangeState::new());
    }
}
