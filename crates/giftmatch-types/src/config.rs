//! Configuration types for the matcher and the reveal ledger.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GiftmatchError, Result, constants};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftmatchConfig {
    pub matcher: MatcherConfig,
    pub ledger: LedgerConfig,
}

impl GiftmatchConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns [`GiftmatchError::Configuration`] on malformed JSON or an
    /// out-of-range value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GiftmatchError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// # Errors
    /// Returns [`GiftmatchError::Configuration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.matcher.max_attempts == 0 {
            return Err(GiftmatchError::Configuration(
                "matcher.max_attempts must be > 0".to_string(),
            ));
        }
        if self.matcher.min_participants < constants::MIN_PARTICIPANTS {
            return Err(GiftmatchError::Configuration(format!(
                "matcher.min_participants must be >= {}",
                constants::MIN_PARTICIPANTS
            )));
        }
        if self.matcher.backtrack_step_budget == 0 {
            return Err(GiftmatchError::Configuration(
                "matcher.backtrack_step_budget must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("ledger.events_collection", &self.ledger.events_collection),
            (
                "ledger.participants_collection",
                &self.ledger.participants_collection,
            ),
            (
                "ledger.assignments_subcollection",
                &self.ledger.assignments_subcollection,
            ),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(GiftmatchError::Configuration(format!(
                    "{name} must be a non-empty single path segment, got {value:?}"
                )));
            }
        }
        Ok(())
    }
}

/// How the matcher searches for an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Shuffle, greedily pair, verify, retry up to `max_attempts` times.
    #[default]
    RandomRetry,
    /// Randomized depth-first search bounded by `backtrack_step_budget`.
    /// Finds an assignment whenever one exists within the budget.
    Backtracking,
}

/// Matcher tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub strategy: MatchStrategy,
    /// Shuffle attempts before reporting infeasibility.
    pub max_attempts: usize,
    /// Smallest roster accepted.
    pub min_participants: usize,
    /// Search nodes the backtracking strategy may visit.
    pub backtrack_step_budget: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            max_attempts: constants::DEFAULT_MAX_ATTEMPTS,
            min_participants: constants::MIN_PARTICIPANTS,
            backtrack_step_budget: constants::DEFAULT_BACKTRACK_STEP_BUDGET,
        }
    }
}

/// What a reveal client does when the remote store is unreachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Answer from the local session state (weaker guarantees).
    #[default]
    Local,
    /// Surface the storage error to the caller.
    Disabled,
}

/// Reveal ledger layout and behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub events_collection: String,
    pub participants_collection: String,
    /// Name of the per-event sub-collection holding reveal records.
    pub assignments_subcollection: String,
    pub fallback: FallbackPolicy,
}

impl LedgerConfig {
    /// Collection path holding the reveal records of `event_id`.
    #[must_use]
    pub fn assignments_collection(&self, event_id: &crate::EventId) -> String {
        format!(
            "{}/{}/{}",
            self.events_collection, event_id, self.assignments_subcollection
        )
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            events_collection: constants::EVENTS_COLLECTION.to_string(),
            participants_collection: constants::PARTICIPANTS_COLLECTION.to_string(),
            assignments_subcollection: constants::ASSIGNMENTS_SUBCOLLECTION.to_string(),
            fallback: FallbackPolicy::default(),
        }
    }
}
