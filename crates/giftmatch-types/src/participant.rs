//! Participant model.
//!
//! A participant is created by the organizer and only ever mutated by
//! deletion. The email is optional at the roster level but required for
//! the remote reveal path: participants without one never get a reveal
//! record of their own (they can still be somebody's match).

use serde::{Deserialize, Serialize};

use crate::{GiftmatchError, NormalizedEmail, ParticipantId, Result};

/// One member of the gift exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Display name, never empty.
    pub name: String,
    /// Reveal credential.
    pub email: Option<NormalizedEmail>,
    /// Free-text wishlist; empty when the participant gave none.
    #[serde(default)]
    pub wishlist: String,
}

impl Participant {
    /// Build a participant from raw organizer input.
    ///
    /// Name and wishlist are trimmed. An empty or whitespace-only email is
    /// treated as "no email".
    ///
    /// # Errors
    /// - `EmptyField` if the name is blank
    /// - `InvalidEmail` if a non-blank email is malformed
    pub fn new(name: &str, email: Option<&str>, wishlist: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GiftmatchError::EmptyField { field: "name" });
        }
        let email = match email.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(NormalizedEmail::parse(raw)?),
            _ => None,
        };
        Ok(Self {
            id: ParticipantId::new(),
            name: name.to_string(),
            email,
            wishlist: wishlist.trim().to_string(),
        })
    }

    /// Whether this participant can use the remote reveal path.
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Participant {
    /// Participant named `name` with email `<name>@example.com`.
    pub fn dummy(name: &str) -> Self {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        Self::new(name, Some(&email), "").expect("dummy participant is valid")
    }

    /// Participant without an email.
    pub fn dummy_without_email(name: &str) -> Self {
        Self::new(name, None, "").expect("dummy participant is valid")
    }

    /// A roster of `n` emailed participants named `P0`, `P1`, ...
    pub fn dummy_roster(n: usize) -> Vec<Self> {
        (0..n).map(|i| Self::dummy(&format!("P{i}"))).collect()
    }
}
