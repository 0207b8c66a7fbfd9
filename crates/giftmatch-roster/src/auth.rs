//! Organizer gate.
//!
//! Draws are an organizer-only action. The check itself is a pluggable
//! [`OrganizerVerifier`]; the gate turns a successful check into an
//! [`OrganizerSession`] token, which the draw service demands as proof.

use chrono::{DateTime, Utc};
use giftmatch_types::{GiftmatchError, Result};
use sha2::{Digest, Sha256};

/// Decides whether a presented credential belongs to the organizer.
pub trait OrganizerVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Accepts any credential. For single-user setups with no organizer secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

impl OrganizerVerifier for OpenAccess {
    fn verify(&self, _credential: &str) -> bool {
        true
    }
}

/// Compares the SHA-256 digest of a passcode against a configured digest.
///
/// Only the digest is held, so a verifier can be built from configuration
/// without the plain passcode ever being stored.
#[derive(Clone)]
pub struct PasscodeVerifier {
    digest: [u8; 32],
}

impl PasscodeVerifier {
    #[must_use]
    pub fn from_passcode(passcode: &str) -> Self {
        Self {
            digest: passcode_digest(passcode),
        }
    }

    /// Build from a hex-encoded SHA-256 digest.
    ///
    /// # Errors
    /// `Configuration` if `hex_digest` is not 64 hex characters.
    pub fn from_digest_hex(hex_digest: &str) -> Result<Self> {
        let bytes = hex::decode(hex_digest.trim())
            .map_err(|e| GiftmatchError::Configuration(format!("organizer digest: {e}")))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| {
            GiftmatchError::Configuration("organizer digest must be 32 bytes".into())
        })?;
        Ok(Self { digest })
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

impl std::fmt::Debug for PasscodeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeVerifier").finish_non_exhaustive()
    }
}

impl OrganizerVerifier for PasscodeVerifier {
    fn verify(&self, credential: &str) -> bool {
        let presented = passcode_digest(credential);
        // Full-length comparison, no early exit.
        presented
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

fn passcode_digest(passcode: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(passcode.as_bytes());
    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Proof that the organizer check passed.
///
/// Only [`OrganizerGate::open`] creates one (plus a test constructor).
#[derive(Debug, Clone)]
pub struct OrganizerSession {
    opened_at: DateTime<Utc>,
}

impl OrganizerSession {
    #[must_use]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// An already-open session, for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            opened_at: Utc::now(),
        }
    }
}

/// Wraps a verifier and issues sessions.
pub struct OrganizerGate {
    verifier: Box<dyn OrganizerVerifier>,
}

impl OrganizerGate {
    pub fn new(verifier: impl OrganizerVerifier + 'static) -> Self {
        Self {
            verifier: Box::new(verifier),
        }
    }

    /// Check `credential` and open a session.
    ///
    /// # Errors
    /// `Unauthorized` if the verifier rejects it.
    pub fn open(&self, credential: &str) -> Result<OrganizerSession> {
        if !self.verifier.verify(credential) {
            tracing::warn!("Organizer verification rejected");
            return Err(GiftmatchError::Unauthorized);
        }
        tracing::debug!("Organizer session opened");
        Ok(OrganizerSession {
            opened_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for OrganizerGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizerGate").finish_non_exhaustive()
    }
}
