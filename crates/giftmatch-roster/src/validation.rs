//! Roster validation: hard gate for organizer input.
//!
//! Every participant, exclusion and draw request passes through these
//! checks before any state is touched.
//!
//! ## Design Principles
//!
//! - **Fail-closed**: the first failing rule rejects the whole request
//! - **No partial writes**: callers validate first, then mutate
//! - **Context-aware**: uniqueness rules need the current roster, so every
//!   check takes it explicitly

use giftmatch_types::{
    ExclusionSet, GiftmatchError, Participant, ParticipantId, Result,
};

/// Check a new participant against the existing roster.
///
/// Display names are unique case-insensitively; emails are unique after
/// normalization.
///
/// # Errors
/// - `DuplicateParticipant` if the id is already present
/// - `DuplicateName` on a case-insensitive name clash
/// - `DuplicateEmail` on a normalized email clash
pub fn validate_new_participant(roster: &[Participant], candidate: &Participant) -> Result<()> {
    let candidate_name = candidate.name.to_lowercase();
    for existing in roster {
        if existing.id == candidate.id {
            return Err(GiftmatchError::DuplicateParticipant(candidate.id));
        }
        if existing.name.to_lowercase() == candidate_name {
            return Err(GiftmatchError::DuplicateName(candidate.name.clone()));
        }
        if let (Some(a), Some(b)) = (&existing.email, &candidate.email) {
            if a == b {
                return Err(GiftmatchError::DuplicateEmail(b.to_string()));
            }
        }
    }
    Ok(())
}

/// Check that `a` and `b` can be excluded from each other.
///
/// # Errors
/// - `SelfExclusion` if `a == b`
/// - `UnknownParticipant` if either id is not on the roster
/// - `DuplicateExclusion` if the pair already exists
pub fn validate_exclusion(
    roster: &[Participant],
    exclusions: &ExclusionSet,
    a: ParticipantId,
    b: ParticipantId,
) -> Result<()> {
    if a == b {
        return Err(GiftmatchError::SelfExclusion(a));
    }
    for id in [a, b] {
        if !roster.iter().any(|p| p.id == id) {
            return Err(GiftmatchError::UnknownParticipant(id));
        }
    }
    if exclusions.forbids(a, b) {
        return Err(GiftmatchError::DuplicateExclusion(a, b));
    }
    Ok(())
}

/// Check that a draw can be attempted at all.
///
/// # Errors
/// Returns `TooFewParticipants` below `min_participants`.
pub fn validate_ready(roster: &[Participant], min_participants: usize) -> Result<()> {
    if roster.len() < min_participants {
        return Err(GiftmatchError::TooFewParticipants {
            required: min_participants,
            actual: roster.len(),
        });
    }
    Ok(())
}

/// Re-check a whole roster, e.g. one loaded from a snapshot.
///
/// # Errors
/// The first uniqueness or exclusion violation found.
pub fn validate_roster(roster: &[Participant], exclusions: &ExclusionSet) -> Result<()> {
    for (i, participant) in roster.iter().enumerate() {
        if participant.name.trim().is_empty() {
            return Err(GiftmatchError::EmptyField { field: "name" });
        }
        validate_new_participant(&roster[..i], participant)?;
    }
    for pair in exclusions.iter() {
        let (a, b) = pair.members();
        for id in [a, b] {
            if !roster.iter().any(|p| p.id == id) {
                return Err(GiftmatchError::UnknownParticipant(id));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use giftmatch_types::*;

    use super::*;

    #[test]
    fn duplicate_name_is_case_insensitive() {
        let roster = vec![Participant::dummy("Alice")];
        let candidate = Participant::new("ALICE", Some("other@example.com"), "").unwrap();
        let err = validate_new_participant(&roster, &candidate).unwrap_err();
        assert!(matches!(err, GiftmatchError::DuplicateName(ref n) if n == "ALICE"));
    }

    #[test]
    fn duplicate_email_after_normalization() {
        let roster = vec![Participant::new("Alice", Some("alice@example.com"), "").unwrap()];
        let candidate = Participant::new("Alicia", Some("  ALICE@example.com "), "").unwrap();
        let err = validate_new_participant(&roster, &candidate).unwrap_err();
        assert!(matches!(err, GiftmatchError::DuplicateEmail(ref e) if e == "alice@example.com"));
    }

    #[test]
    fn missing_emails_never_clash() {
        let roster = vec![Participant::dummy_without_email("Alice")];
        let candidate = Participant::dummy_without_email("Bob");
        assert!(validate_new_participant(&roster, &candidate).is_ok());
    }

    #[test]
    fn exclusion_checks() {
        let roster = Participant::dummy_roster(3);
        let (a, b) = (roster[0].id, roster[1].id);
        let mut exclusions = ExclusionSet::new();

        assert!(matches!(
            validate_exclusion(&roster, &exclusions, a, a),
            Err(GiftmatchError::SelfExclusion(_))
        ));
        let stranger = ParticipantId::new();
        assert!(matches!(
            validate_exclusion(&roster, &exclusions, a, stranger),
            Err(GiftmatchError::UnknownParticipant(id)) if id == stranger
        ));
        assert!(validate_exclusion(&roster, &exclusions, a, b).is_ok());
        exclusions.insert(a, b).unwrap();
        assert!(matches!(
            validate_exclusion(&roster, &exclusions, b, a),
            Err(GiftmatchError::DuplicateExclusion(..))
        ));
    }

    #[test]
    fn ready_needs_three() {
        assert!(validate_ready(&Participant::dummy_roster(2), 3).is_err());
        assert!(validate_ready(&Participant::dummy_roster(3), 3).is_ok());
    }

    #[test]
    fn roster_revalidation_catches_dangling_exclusion() {
        let roster = Participant::dummy_roster(3);
        let mut exclusions = ExclusionSet::new();
        exclusions.insert(roster[0].id, ParticipantId::new()).unwrap();
        assert!(matches!(
            validate_roster(&roster, &exclusions),
            Err(GiftmatchError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn roster_revalidation_catches_duplicates() {
        let mut roster = Participant::dummy_roster(3);
        let mut twin = Participant::dummy("P0");
        twin.email = None;
        roster.push(twin);
        assert!(matches!(
            validate_roster(&roster, &ExclusionSet::new()),
            Err(GiftmatchError::DuplicateName(_))
        ));
    }
}
