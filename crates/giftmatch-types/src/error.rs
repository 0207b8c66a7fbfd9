//! Error types for the GiftMatch exchange engine.
//!
//! All errors use the `GM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors (roster, exclusions, event details)
//! - 2xx: Matching errors
//! - 3xx: Reveal errors
//! - 4xx: Storage errors
//! - 5xx: Access errors
//! - 9xx: General / internal errors
//!
//! A reveal lookup for an unknown email is **not** an error: it is the
//! `NotFound` arm of [`crate::RevealOutcome`].

use thiserror::Error;

use crate::{EventId, ParticipantId};

/// Central error enum for all GiftMatch operations.
#[derive(Debug, Error)]
pub enum GiftmatchError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// Fewer participants than the matcher can work with.
    #[error("GM_ERR_100: Need at least {required} participants, have {actual}")]
    TooFewParticipants { required: usize, actual: usize },

    /// The email address is not well formed.
    #[error("GM_ERR_101: Invalid email address: {0:?}")]
    InvalidEmail(String),

    /// Another participant already uses this (normalized) email.
    #[error("GM_ERR_102: A participant with email {0} already exists")]
    DuplicateEmail(String),

    /// Another participant already uses this display name.
    #[error("GM_ERR_103: A participant named {0:?} already exists")]
    DuplicateName(String),

    /// A required field was empty after trimming.
    #[error("GM_ERR_104: {field} must not be empty")]
    EmptyField { field: &'static str },

    /// An exclusion pairs a participant with themselves.
    #[error("GM_ERR_105: Cannot exclude participant {0} from themselves")]
    SelfExclusion(ParticipantId),

    /// The same unordered exclusion pair was added twice.
    #[error("GM_ERR_106: Exclusion between {0} and {1} already exists")]
    DuplicateExclusion(ParticipantId, ParticipantId),

    /// A participant id that is not part of the roster was referenced.
    #[error("GM_ERR_107: Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// The budget range is inverted.
    #[error("GM_ERR_108: Invalid budget: {reason}")]
    InvalidBudget { reason: String },

    /// A participant id appears more than once in the matcher input.
    #[error("GM_ERR_109: Duplicate participant id in input: {0}")]
    DuplicateParticipant(ParticipantId),

    // =================================================================
    // Matching Errors (2xx)
    // =================================================================
    /// No valid assignment was found within the attempt budget.
    ///
    /// Covers both "truly infeasible" and "not found in time"; the two
    /// cannot be told apart.
    #[error(
        "GM_ERR_200: Could not generate valid assignments after {attempts} attempts. \
         Try reducing exclusions."
    )]
    InfeasibleMatching { attempts: usize },

    /// An assignment violates one of the matching invariants.
    #[error("GM_ERR_201: Invalid assignment: {reason}")]
    InvalidAssignment { reason: String },

    /// A publish or reveal was attempted before any draw was run.
    #[error("GM_ERR_202: No assignment has been generated yet")]
    NoAssignment,

    // =================================================================
    // Reveal Errors (3xx)
    // =================================================================
    /// The local session belongs to a different event.
    #[error("GM_ERR_300: Event mismatch: session holds {held}, request was for {requested}")]
    EventMismatch { held: EventId, requested: EventId },

    /// The receiver recorded for a giver no longer resolves to a participant.
    #[error("GM_ERR_301: Match for participant {0} could not be resolved")]
    UnresolvedMatch(ParticipantId),

    // =================================================================
    // Storage Errors (4xx)
    // =================================================================
    /// The backing store could not be reached.
    #[error("GM_ERR_400: Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// A write (single, batch, or transactional) was rejected.
    #[error("GM_ERR_401: Storage write failed: {reason}")]
    StorageWriteFailed { reason: String },

    /// A stored document did not have the expected shape.
    #[error("GM_ERR_402: Corrupt document {collection}/{key}: {reason}")]
    CorruptDocument {
        collection: String,
        key: String,
        reason: String,
    },

    // =================================================================
    // Access Errors (5xx)
    // =================================================================
    /// The organizer credential was rejected.
    #[error("GM_ERR_500: Organizer verification failed")]
    Unauthorized,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("GM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk).
    #[error("GM_ERR_903: I/O error: {0}")]
    Io(String),
}

impl GiftmatchError {
    /// Whether this error was raised by input validation (1xx).
    ///
    /// Validation errors are always raised before any state is touched.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooFewParticipants { .. }
                | Self::InvalidEmail(_)
                | Self::DuplicateEmail(_)
                | Self::DuplicateName(_)
                | Self::EmptyField { .. }
                | Self::SelfExclusion(_)
                | Self::DuplicateExclusion(..)
                | Self::UnknownParticipant(_)
                | Self::InvalidBudget { .. }
                | Self::DuplicateParticipant(_)
        )
    }

    /// Whether this error means the store could not be reached at all.
    ///
    /// Read paths fail over to the local ledger on these.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GiftmatchError>;

impl From<std::io::Error> for GiftmatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GiftmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
