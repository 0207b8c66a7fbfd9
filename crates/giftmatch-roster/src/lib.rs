//! # giftmatch-roster
//!
//! **Organizer plane**: everything that happens before and around a draw.
//!
//! ## Architecture
//!
//! 1. **validation**: hard gate for roster and exclusion input
//! 2. **ExchangeState**: the owned session value (roster, exclusions,
//!    event, current draw, local reveal list), JSON snapshot included
//! 3. **OrganizerGate**: turns a verified credential into an
//!    `OrganizerSession`
//! 4. **run_draw**: runs MatchCore and installs the result
//!
//! ## Flow
//!
//! ```text
//! organizer input → validation → ExchangeState
//! OrganizerGate.open() → OrganizerSession → run_draw() → DrawReceipt
//!     → giftmatch-ledger publish
//! ```

pub mod auth;
pub mod draw;
pub mod state;
pub mod validation;

pub use auth::{OpenAccess, OrganizerGate, OrganizerSession, OrganizerVerifier, PasscodeVerifier};
pub use draw::{DrawReceipt, run_draw};
pub use state::ExchangeState;
pub use validation::{validate_exclusion, validate_new_participant, validate_ready, validate_roster};
