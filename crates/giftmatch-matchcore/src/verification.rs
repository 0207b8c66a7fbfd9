//! Assignment verification and fingerprinting.
//!
//! Every assignment that leaves MatchCore, or is loaded back from a saved
//! session, must satisfy three invariants:
//!
//! 1. nobody is matched to themselves,
//! 2. no matched pair is excluded (either direction),
//! 3. the mapping is a permutation of the roster.
//!
//! The digest is a SHA-256 over the ordered pairs. It is recorded with a
//! published event so that two publishes of the same draw can be told
//! apart from a re-draw without comparing full payloads.

use std::collections::HashSet;

use giftmatch_types::{Assignment, ExclusionSet, GiftmatchError, Participant, Result};
use sha2::{Digest, Sha256};

/// Check `assignment` against the roster and exclusion set.
///
/// # Errors
/// Returns [`GiftmatchError::InvalidAssignment`] naming the first violated
/// invariant.
pub fn verify_assignment(
    assignment: &Assignment,
    participants: &[Participant],
    exclusions: &ExclusionSet,
) -> Result<()> {
    let roster: HashSet<_> = participants.iter().map(|p| p.id).collect();

    if assignment.len() != roster.len() || roster.len() != participants.len() {
        return Err(invalid(format!(
            "{} pairs for {} participants",
            assignment.len(),
            participants.len()
        )));
    }

    let mut receivers = HashSet::with_capacity(roster.len());
    for (giver, receiver) in assignment.iter() {
        if !roster.contains(&giver) {
            return Err(invalid(format!("giver {giver} is not on the roster")));
        }
        if !roster.contains(&receiver) {
            return Err(invalid(format!("receiver {receiver} is not on the roster")));
        }
        if giver == receiver {
            return Err(invalid(format!("{giver} is matched to themselves")));
        }
        if exclusions.forbids(giver, receiver) {
            return Err(invalid(format!("{giver} -> {receiver} is an excluded pair")));
        }
        if !receivers.insert(receiver) {
            return Err(invalid(format!("{receiver} receives more than one gift")));
        }
    }
    Ok(())
}

fn invalid(reason: String) -> GiftmatchError {
    GiftmatchError::InvalidAssignment { reason }
}

/// Compute the assignment digest.
///
/// Depends only on the `(giver, receiver)` pairs, which iterate in giver-id
/// order, so equal assignments always produce equal digests.
#[must_use]
pub fn assignment_digest(assignment: &Assignment) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"giftmatch:assignment:v1:");
    hasher.update((assignment.len() as u64).to_le_bytes());
    for (giver, receiver) in assignment.iter() {
        hasher.update(giver.0.as_bytes());
        hasher.update(receiver.0.as_bytes());
    }
    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Hex form of [`assignment_digest`], as stored in event documents.
#[must_use]
pub fn assignment_digest_hex(assignment: &Assignment) -> String {
    hex::encode(assignment_digest(assignment))
}
