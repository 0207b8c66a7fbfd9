//! Local reveal ledger over the organizer's own [`ExchangeState`].
//!
//! Used when the remote store is unreachable. Records are derived from the
//! current draw on every call and the revealed set lives in the session
//! state, so a reveal survives a snapshot save/load but is only at-most-once
//! within this one process. There is no concurrency control beyond the
//! `&mut` borrow.

use giftmatch_roster::ExchangeState;
use giftmatch_types::{
    EventId, GiftmatchError, RevealOutcome, RevealRecord, RevealState, RevealStatus, Result,
};

use crate::records::record_for;

/// Reveal ledger backed by session state.
#[derive(Debug)]
pub struct LocalLedger<'a> {
    state: &'a mut ExchangeState,
}

impl<'a> LocalLedger<'a> {
    pub fn new(state: &'a mut ExchangeState) -> Self {
        Self { state }
    }

    /// # Errors
    /// - `NoAssignment` if the session has no draw
    /// - `EventMismatch` if the draw belongs to another event
    /// - `UnresolvedMatch` if the session's draw is inconsistent
    pub fn lookup(&self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>> {
        self.check_event(event_id)?;
        let Some(giver) = self.state.participant_by_email(email) else {
            return Ok(None);
        };
        let assignment = self.state.assignment().ok_or(GiftmatchError::NoAssignment)?;
        let receiver = assignment
            .receiver_of(giver.id)
            .and_then(|id| self.state.participant(id))
            .ok_or(GiftmatchError::UnresolvedMatch(giver.id))?;

        Ok(Some(record_for(
            giver,
            receiver,
            &self.state.event().budget,
            self.state.is_revealed(giver.id),
        )))
    }

    /// # Errors
    /// Same as [`Self::lookup`].
    pub fn reveal(&mut self, event_id: &EventId, email: &str) -> Result<RevealOutcome> {
        let Some(mut record) = self.lookup(event_id, email)? else {
            return Ok(RevealOutcome::NotFound);
        };
        if record.state().can_transition_to(RevealState::Revealed)
            && self.state.mark_revealed(record.participant_id)
        {
            record.revealed = true;
            tracing::info!(
                event_id = %event_id,
                participant = %record.participant_id,
                "Match revealed locally"
            );
            Ok(RevealOutcome::Revealed(record))
        } else {
            Ok(RevealOutcome::AlreadyRevealed(record))
        }
    }

    /// Counts over participants who have an email, the same population the
    /// remote ledger publishes.
    ///
    /// # Errors
    /// `NoAssignment` or `EventMismatch`.
    pub fn status(&self, event_id: &EventId) -> Result<RevealStatus> {
        self.check_event(event_id)?;
        let emailed = self.state.participants().iter().filter(|p| p.has_email());
        let (total, revealed) = emailed.fold((0, 0), |(total, revealed), p| {
            (total + 1, revealed + usize::from(self.state.is_revealed(p.id)))
        });
        Ok(RevealStatus { total, revealed })
    }

    fn check_event(&self, event_id: &EventId) -> Result<()> {
        if self.state.assignment().is_none() {
            return Err(GiftmatchError::NoAssignment);
        }
        match self.state.event_id() {
            Some(held) if held == event_id => Ok(()),
            Some(held) => Err(GiftmatchError::EventMismatch {
                held: held.clone(),
                requested: event_id.clone(),
            }),
            None => Err(GiftmatchError::NoAssignment),
        }
    }
}
