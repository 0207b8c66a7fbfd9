//! System-wide constants for the GiftMatch exchange engine.

/// Minimum roster size the matcher accepts.
///
/// Below three participants a derangement that also respects exclusions
/// cannot generally be guaranteed.
pub const MIN_PARTICIPANTS: usize = 3;

/// Default number of shuffle attempts before the matcher gives up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Default node budget for the backtracking strategy.
pub const DEFAULT_BACKTRACK_STEP_BUDGET: usize = 200_000;

/// Top-level collection holding one document per event.
pub const EVENTS_COLLECTION: &str = "events";

/// Top-level collection holding one mirror document per participant.
pub const PARTICIPANTS_COLLECTION: &str = "participants";

/// Sub-collection (under an event document) holding reveal records.
pub const ASSIGNMENTS_SUBCOLLECTION: &str = "assignments";

/// Prefix of generated event identifiers.
pub const EVENT_ID_PREFIX: &str = "ss_";

/// Length of the random suffix of generated event identifiers.
pub const EVENT_ID_RANDOM_LEN: usize = 9;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "GiftMatch";
