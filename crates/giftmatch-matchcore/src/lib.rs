//! # giftmatch-matchcore
//!
//! **Pure assignment generator for GiftMatch.**
//!
//! MatchCore is the compute plane -- it takes a roster and an exclusion set
//! and produces a giver → receiver permutation. It has:
//!
//! - **Zero side effects**: no storage, no session state, no I/O
//! - **No self-matches**: nobody is ever their own receiver
//! - **No excluded pairs**: forbidden pairs are rejected in both directions
//! - **Bounded work**: every strategy gives up after a fixed budget

pub mod matcher;
pub mod verification;

pub use matcher::{fisher_yates, generate, generate_with_rng};
pub use verification::{assignment_digest, assignment_digest_hex, verify_assignment};
