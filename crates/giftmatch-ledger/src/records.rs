//! Reveal record construction, shared by the remote and local ledgers.

use std::collections::{HashMap, HashSet};

use giftmatch_types::{
    Assignment, BudgetRange, GiftmatchError, NormalizedEmail, Participant, ParticipantId,
    RevealRecord, Result,
};

/// Records for one assignment, keyed by the giver's email.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<(NormalizedEmail, RevealRecord)>,
    /// Givers with no email. They still appear as somebody's match.
    pub without_email: Vec<ParticipantId>,
}

/// Build one unrevealed record per giver that has an email.
///
/// # Errors
/// - `UnresolvedMatch` if a giver in `assignment` is missing from
///   `participants`, or their receiver is
/// - `DuplicateEmail` if two givers share a normalized email, since both
///   records would land on one key
pub fn build_records(
    participants: &[Participant],
    assignment: &Assignment,
    budget: &BudgetRange,
) -> Result<RecordSet> {
    let by_id: HashMap<ParticipantId, &Participant> =
        participants.iter().map(|p| (p.id, p)).collect();
    let mut set = RecordSet::default();
    let mut seen = HashSet::new();

    for (giver_id, receiver_id) in assignment.iter() {
        let giver = by_id
            .get(&giver_id)
            .ok_or(GiftmatchError::UnresolvedMatch(giver_id))?;
        let receiver = by_id
            .get(&receiver_id)
            .ok_or(GiftmatchError::UnresolvedMatch(giver_id))?;

        let Some(email) = &giver.email else {
            set.without_email.push(giver_id);
            continue;
        };
        if !seen.insert(email.as_str()) {
            return Err(GiftmatchError::DuplicateEmail(email.to_string()));
        }
        set.records
            .push((email.clone(), record_for(giver, receiver, budget, false)));
    }
    Ok(set)
}

/// The record `giver` sees when their match is `receiver`.
#[must_use]
pub fn record_for(
    giver: &Participant,
    receiver: &Participant,
    budget: &BudgetRange,
    revealed: bool,
) -> RevealRecord {
    RevealRecord {
        participant_id: giver.id,
        giver_name: giver.name.clone(),
        match_name: receiver.name.clone(),
        match_wishlist: receiver.wishlist.clone(),
        budget: *budget,
        revealed,
    }
}
