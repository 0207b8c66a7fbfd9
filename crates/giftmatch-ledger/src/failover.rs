//! The reveal contract as a trait, and a client that fails over from the
//! remote ledger to the local one.
//!
//! Failover only happens on [`GiftmatchError::StorageUnavailable`] and only
//! when [`FallbackPolicy::Local`] is configured. Every failover is logged at
//! `warn`, since local answers carry weaker guarantees.

use giftmatch_roster::ExchangeState;
use giftmatch_types::{
    EventId, FallbackPolicy, GiftmatchError, RevealOutcome, RevealRecord, RevealStatus, Result,
};

use crate::local::LocalLedger;
use crate::remote::RemoteLedger;
use crate::store::DocumentStore;

/// One-time reveal contract.
pub trait RevealLedger {
    /// Read a record without revealing it. `None` for unknown emails.
    fn lookup(&mut self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>>;

    /// Reveal a record, flipping it on the first call.
    fn reveal(&mut self, event_id: &EventId, email: &str) -> Result<RevealOutcome>;

    fn status(&mut self, event_id: &EventId) -> Result<RevealStatus>;
}

impl<S: DocumentStore> RevealLedger for RemoteLedger<S> {
    fn lookup(&mut self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>> {
        RemoteLedger::lookup(self, event_id, email)
    }

    fn reveal(&mut self, event_id: &EventId, email: &str) -> Result<RevealOutcome> {
        RemoteLedger::reveal(self, event_id, email)
    }

    fn status(&mut self, event_id: &EventId) -> Result<RevealStatus> {
        RemoteLedger::status(self, event_id)
    }
}

impl RevealLedger for LocalLedger<'_> {
    fn lookup(&mut self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>> {
        LocalLedger::lookup(self, event_id, email)
    }

    fn reveal(&mut self, event_id: &EventId, email: &str) -> Result<RevealOutcome> {
        LocalLedger::reveal(self, event_id, email)
    }

    fn status(&mut self, event_id: &EventId) -> Result<RevealStatus> {
        LocalLedger::status(self, event_id)
    }
}

/// Remote first, local when the store cannot be reached.
#[derive(Debug)]
pub struct FailoverLedger<'a, S> {
    remote: &'a RemoteLedger<S>,
    state: &'a mut ExchangeState,
    policy: FallbackPolicy,
}

impl<'a, S: DocumentStore> FailoverLedger<'a, S> {
    /// Uses the fallback policy from the remote ledger's configuration.
    pub fn new(remote: &'a RemoteLedger<S>, state: &'a mut ExchangeState) -> Self {
        let policy = remote.config().fallback;
        Self {
            remote,
            state,
            policy,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn should_fail_over(&self, err: &GiftmatchError, operation: &'static str) -> bool {
        if !err.is_unavailable() {
            return false;
        }
        match self.policy {
            FallbackPolicy::Local => {
                tracing::warn!(operation, error = %err, "Remote ledger unreachable; using local ledger");
                true
            }
            FallbackPolicy::Disabled => {
                tracing::warn!(operation, error = %err, "Remote ledger unreachable; fallback disabled");
                false
            }
        }
    }
}

impl<S: DocumentStore> RevealLedger for FailoverLedger<'_, S> {
    fn lookup(&mut self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>> {
        match self.remote.lookup(event_id, email) {
            Err(err) if self.should_fail_over(&err, "lookup") => {
                LocalLedger::new(&mut *self.state).lookup(event_id, email)
            }
            other => other,
        }
    }

    fn reveal(&mut self, event_id: &EventId, email: &str) -> Result<RevealOutcome> {
        match self.remote.reveal(event_id, email) {
            Err(err) if self.should_fail_over(&err, "reveal") => {
                LocalLedger::new(&mut *self.state).reveal(event_id, email)
            }
            other => other,
        }
    }

    fn status(&mut self, event_id: &EventId) -> Result<RevealStatus> {
        match self.remote.status(event_id) {
            Err(err) if self.should_fail_over(&err, "status") => {
                LocalLedger::new(&mut *self.state).status(event_id)
            }
            other => other,
        }
    }
}
