//! # giftmatch-types
//!
//! Shared types, errors, and configuration for the **GiftMatch** exchange
//! engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`EventId`]
//! - **Roster model**: [`Participant`], [`NormalizedEmail`]
//! - **Constraints**: [`UnorderedPair`], [`ExclusionSet`]
//! - **Event model**: [`EventDetails`], [`BudgetRange`]
//! - **Matching output**: [`Assignment`]
//! - **Reveal model**: [`RevealRecord`], [`RevealState`], [`RevealOutcome`], [`RevealStatus`]
//! - **Configuration**: [`GiftmatchConfig`], [`MatcherConfig`], [`LedgerConfig`]
//! - **Errors**: [`GiftmatchError`] with `GM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod assignment;
pub mod config;
pub mod constants;
pub mod email;
pub mod error;
pub mod event;
pub mod exclusion;
pub mod ids;
pub mod participant;
pub mod reveal;

// Re-export all primary types at crate root for ergonomic imports:
//   use giftmatch_types::{Participant, ExclusionSet, Assignment, ...};

pub use assignment::*;
pub use config::*;
pub use email::*;
pub use error::*;
pub use event::*;
pub use exclusion::*;
pub use ids::*;
pub use participant::*;
pub use reveal::*;

// Constants are accessed via `giftmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
