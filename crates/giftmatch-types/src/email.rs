//! Email normalization and validation.
//!
//! Emails are the participant's reveal credential. Every key derived from
//! an email uses the normalized form: surrounding whitespace trimmed and
//! lower-cased, so `"  A@X.com "` and `"a@x.com"` address the same record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GiftmatchError, Result};

/// Trim and lower-case an email without validating it.
///
/// Lookups use this directly: a malformed email simply finds nothing.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Structural email check: one `@`, a non-empty local part, a domain with
/// an interior dot, and no whitespace anywhere.
///
/// `/` is rejected too. The normalized email is the reveal record's document
/// key, and document keys cannot contain a path separator.
#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.is_empty() || email.chars().any(|c| c.is_whitespace() || c == '/') {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len() && !domain.starts_with('.'),
        None => false,
    }
}

/// A validated, normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Validate and normalize.
    ///
    /// # Errors
    /// Returns [`GiftmatchError::InvalidEmail`] if the address is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        if !is_valid_email(raw) {
            return Err(GiftmatchError::InvalidEmail(raw.to_string()));
        }
        Ok(Self(normalize_email(raw)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NormalizedEmail {
    type Error = GiftmatchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<NormalizedEmail> for String {
    fn from(value: NormalizedEmail) -> Self {
        value.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
