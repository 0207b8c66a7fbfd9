//! # giftmatch-ledger
//!
//! **Reveal plane**: publishes a draw and lets each participant see their
//! match exactly once.
//!
//! ## Architecture
//!
//! 1. **DocumentStore**: narrow storage interface (get, set, delete, query,
//!    atomic batch, per-key transaction); `InMemoryStore` implements it
//! 2. **RemoteLedger**: authoritative ledger over a store; atomic publish,
//!    transactional reveal, status board, participant mirror documents
//! 3. **LocalLedger**: fallback over the organizer's `ExchangeState`
//! 4. **FailoverLedger**: remote first, local on `StorageUnavailable`
//!    when `FallbackPolicy::Local` allows it
//!
//! ## Reveal Flow
//!
//! ```text
//! run_draw() → RemoteLedger.publish() → events/{id}/assignments/{email}
//! participant → reveal(event_id, email) → Revealed | AlreadyRevealed | NotFound
//! ```

pub mod failover;
pub mod local;
pub mod memory;
pub mod records;
pub mod remote;
pub mod store;

pub use failover::{FailoverLedger, RevealLedger};
pub use local::LocalLedger;
pub use memory::InMemoryStore;
pub use records::{RecordSet, build_records};
pub use remote::{EventDocument, ParticipantDocument, PublishReport, RemoteLedger};
pub use store::{Document, DocumentStore, StoredDocument, Transform, WriteOp};
