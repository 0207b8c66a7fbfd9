//! Draw service: roster in, installed assignment out.
//!
//! ```text
//! OrganizerSession ─┐
//! ExchangeState ────┼─► validate_ready ─► MatchCore ─► verify ─► install
//! MatcherConfig ────┘
//! ```
//!
//! Nothing is written to the state until the matcher has succeeded and its
//! output has been verified, so a failed draw leaves the previous draw (if
//! any) in place.

use chrono::{DateTime, Utc};
use giftmatch_matchcore::{assignment_digest_hex, generate_with_rng, verify_assignment};
use giftmatch_types::{EventId, MatcherConfig, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::auth::OrganizerSession;
use crate::state::ExchangeState;
use crate::validation::validate_ready;

/// Summary of a completed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawReceipt {
    pub event_id: EventId,
    /// Number of giver → receiver pairs.
    pub pairs: usize,
    /// Participants who can only learn their match through the local ledger.
    pub without_email: usize,
    /// Hex SHA-256 of the assignment.
    pub digest: String,
    /// When the organizer session that authorized this draw was opened.
    pub authorized_at: DateTime<Utc>,
    pub drawn_at: DateTime<Utc>,
}

/// Run a draw and install it into `state`.
///
/// # Errors
/// - `TooFewParticipants` below `config.min_participants`
/// - `InfeasibleMatching` if the matcher gives up
/// - `InvalidAssignment` if the matcher output fails verification
///
/// On any error `state` is unchanged.
pub fn run_draw<R: Rng + ?Sized>(
    state: &mut ExchangeState,
    session: &OrganizerSession,
    config: &MatcherConfig,
    rng: &mut R,
) -> Result<DrawReceipt> {
    validate_ready(state.participants(), config.min_participants)?;

    let assignment = generate_with_rng(state.participants(), state.exclusions(), config, rng)?;
    verify_assignment(&assignment, state.participants(), state.exclusions())?;

    let digest = assignment_digest_hex(&assignment);
    let pairs = assignment.len();
    let without_email = state.participants().iter().filter(|p| !p.has_email()).count();
    let event_id = state.install_draw(assignment, EventId::generate(rng));

    if without_email > 0 {
        tracing::warn!(
            event_id = %event_id,
            without_email,
            "Some participants have no email and cannot use the remote reveal"
        );
    }
    tracing::info!(
        event_id = %event_id,
        pairs,
        digest = %digest,
        session_opened_at = %session.opened_at(),
        "Draw installed"
    );

    Ok(DrawReceipt {
        event_id,
        pairs,
        without_email,
        digest,
        authorized_at: session.opened_at(),
        drawn_at: Utc::now(),
    })
}
