//! Remote reveal ledger over a [`DocumentStore`].
//!
//! ## Layout
//!
//! ```text
//! events/{event_id}                              EventDocument
//! events/{event_id}/assignments/{email}          RevealRecord
//! participants/{participant_id}                  ParticipantDocument
//! ```
//!
//! ## Guarantees
//!
//! - `publish` is one atomic batch. Records and mirror documents left over
//!   from an earlier publish of the same event are deleted in that batch,
//!   so the visible record set is always exactly one publish.
//! - `reveal` flips `revealed` inside a per-key transaction. Of any number
//!   of concurrent reveals for one email, exactly one observes
//!   [`RevealOutcome::Revealed`].
//! - The participant mirror is informational. Failing to update it never
//!   fails a reveal.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use giftmatch_matchcore::assignment_digest_hex;
use giftmatch_types::{
    Assignment, BudgetRange, EventDetails, EventId, LedgerConfig, Participant, RevealOutcome,
    RevealRecord, RevealState, RevealStatus, Result, normalize_email,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::build_records;
use crate::store::{Document, DocumentStore, WriteOp, from_document, to_document};

/// `events/{event_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub organizer_name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub budget: BudgetRange,
    #[serde(default)]
    pub message: String,
    pub participant_count: usize,
    pub record_count: usize,
    /// Hex SHA-256 of the published assignment.
    pub assignment_digest: String,
    pub published_at: DateTime<Utc>,
}

/// `participants/{participant_id}`: organizer-facing mirror of one
/// participant and their match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDocument {
    pub event_id: EventId,
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub wishlist: String,
    pub match_name: Option<String>,
    pub match_email: Option<String>,
    pub is_revealed: bool,
}

/// What a publish wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub event_id: EventId,
    /// Reveal records written.
    pub records: usize,
    /// Givers skipped for lack of an email.
    pub without_email: usize,
    /// Records and mirror documents from an earlier publish that were deleted.
    pub stale_removed: usize,
    pub assignment_digest: String,
}

/// Authoritative reveal ledger backed by a document store.
#[derive(Debug)]
pub struct RemoteLedger<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: DocumentStore> RemoteLedger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Publish one reveal record per emailed giver, replacing whatever an
    /// earlier publish of `event_id` left behind.
    ///
    /// # Errors
    /// - `UnresolvedMatch` if the assignment names someone not in
    ///   `participants` (nothing is written)
    /// - `DuplicateEmail` if two givers share an email (nothing is written)
    /// - storage errors from the stale-record queries or the batch; the
    ///   batch is all-or-nothing
    pub fn publish(
        &self,
        event_id: &EventId,
        event: &EventDetails,
        assignment: &Assignment,
        participants: &[Participant],
    ) -> Result<PublishReport> {
        let set = build_records(participants, assignment, &event.budget)?;
        let records_collection = self.config.assignments_collection(event_id);
        let participants_collection = &self.config.participants_collection;
        let digest = assignment_digest_hex(assignment);

        let mut ops = Vec::with_capacity(set.records.len() + participants.len() + 1);

        let event_doc = EventDocument {
            organizer_name: event.organizer_name.clone(),
            date: event.date,
            time: event.time,
            budget: event.budget,
            message: event.message.clone(),
            participant_count: participants.len(),
            record_count: set.records.len(),
            assignment_digest: digest.clone(),
            published_at: Utc::now(),
        };
        ops.push(WriteOp::set(
            self.config.events_collection.as_str(),
            event_id.as_str(),
            to_document(&event_doc)?,
        ));

        let mut fresh_records = HashSet::with_capacity(set.records.len());
        for (email, record) in &set.records {
            fresh_records.insert(email.as_str().to_string());
            ops.push(WriteOp::set(
                records_collection.as_str(),
                email.as_str(),
                to_document(record)?,
            ));
        }

        let mut fresh_participants = HashSet::with_capacity(participants.len());
        for participant in participants {
            let receiver = assignment
                .receiver_of(participant.id)
                .and_then(|id| participants.iter().find(|p| p.id == id));
            let mirror = ParticipantDocument {
                event_id: event_id.clone(),
                name: participant.name.clone(),
                email: participant.email.as_ref().map(ToString::to_string),
                wishlist: participant.wishlist.clone(),
                match_name: receiver.map(|r| r.name.clone()),
                match_email: receiver.and_then(|r| r.email.as_ref().map(ToString::to_string)),
                is_revealed: false,
            };
            let key = participant.id.as_key();
            ops.push(WriteOp::set(
                participants_collection.as_str(),
                key.as_str(),
                to_document(&mirror)?,
            ));
            fresh_participants.insert(key);
        }

        let mut stale_removed = 0;
        for stale in self.store.query(&records_collection, &[])? {
            if !fresh_records.contains(&stale.key) {
                ops.push(WriteOp::delete(records_collection.as_str(), stale.key));
                stale_removed += 1;
            }
        }
        let event_filter = [("event_id", Value::from(event_id.as_str()))];
        for stale in self.store.query(participants_collection, &event_filter)? {
            if !fresh_participants.contains(&stale.key) {
                ops.push(WriteOp::delete(participants_collection.as_str(), stale.key));
                stale_removed += 1;
            }
        }

        self.store.atomic_batch(ops)?;

        tracing::info!(
            event_id = %event_id,
            records = set.records.len(),
            without_email = set.without_email.len(),
            stale_removed,
            digest = %digest,
            "Assignments published"
        );

        Ok(PublishReport {
            event_id: event_id.clone(),
            records: set.records.len(),
            without_email: set.without_email.len(),
            stale_removed,
            assignment_digest: digest,
        })
    }

    /// Fetch the record for `email` without revealing it.
    ///
    /// Unknown and mistyped emails both give `None`.
    ///
    /// # Errors
    /// Storage errors, or `CorruptDocument` if the record cannot be decoded.
    pub fn lookup(&self, event_id: &EventId, email: &str) -> Result<Option<RevealRecord>> {
        let Some(key) = record_key(email) else {
            return Ok(None);
        };
        let collection = self.config.assignments_collection(event_id);
        self.store
            .get_document(&collection, &key)?
            .map(|doc| from_document(&collection, &key, doc))
            .transpose()
    }

    /// Reveal the record for `email`, flipping it to revealed if this is the
    /// first time.
    ///
    /// # Errors
    /// Storage errors from the transaction, or `CorruptDocument`. Mirror
    /// update failures are logged, not returned.
    pub fn reveal(&self, event_id: &EventId, email: &str) -> Result<RevealOutcome> {
        let Some(key) = record_key(email) else {
            return Ok(RevealOutcome::NotFound);
        };
        let collection = self.config.assignments_collection(event_id);

        let mut outcome: Result<RevealOutcome> = Ok(RevealOutcome::NotFound);
        self.store
            .transactional_update(&collection, &key, &mut |current: Option<&Document>| {
                let Some(doc) = current else {
                    outcome = Ok(RevealOutcome::NotFound);
                    return None;
                };
                let mut record: RevealRecord = match from_document(&collection, &key, doc.clone()) {
                    Ok(record) => record,
                    Err(err) => {
                        outcome = Err(err);
                        return None;
                    }
                };
                if !record.state().can_transition_to(RevealState::Revealed) {
                    outcome = Ok(RevealOutcome::AlreadyRevealed(record));
                    return None;
                }
                record.revealed = true;
                let mut updated = doc.clone();
                updated.insert("revealed".into(), Value::Bool(true));
                outcome = Ok(RevealOutcome::Revealed(record));
                Some(updated)
            })?;
        let outcome = outcome?;

        match &outcome {
            RevealOutcome::Revealed(record) => {
                tracing::info!(
                    event_id = %event_id,
                    participant = %record.participant_id,
                    "Match revealed"
                );
                self.mirror_revealed(record);
            }
            RevealOutcome::AlreadyRevealed(record) => tracing::debug!(
                event_id = %event_id,
                participant = %record.participant_id,
                "Match already revealed"
            ),
            RevealOutcome::NotFound => tracing::debug!(event_id = %event_id, "No record for email"),
        }
        Ok(outcome)
    }

    fn mirror_revealed(&self, record: &RevealRecord) {
        let mut patch = Document::new();
        patch.insert("is_revealed".into(), Value::Bool(true));
        if let Err(err) = self.store.set_document(
            &self.config.participants_collection,
            &record.participant_id.as_key(),
            patch,
            true,
        ) {
            tracing::warn!(
                participant = %record.participant_id,
                error = %err,
                "Could not mirror reveal onto participant document"
            );
        }
    }

    /// Published and revealed record counts for the organizer.
    ///
    /// # Errors
    /// Storage errors from the query.
    pub fn status(&self, event_id: &EventId) -> Result<RevealStatus> {
        let records = self
            .store
            .query(&self.config.assignments_collection(event_id), &[])?;
        let revealed = records
            .iter()
            .filter(|doc| doc.data.get("revealed") == Some(&Value::Bool(true)))
            .count();
        Ok(RevealStatus {
            total: records.len(),
            revealed,
        })
    }

    /// The event document written by the last publish, if any.
    ///
    /// # Errors
    /// Storage errors, or `CorruptDocument`.
    pub fn published_event(&self, event_id: &EventId) -> Result<Option<EventDocument>> {
        let collection = &self.config.events_collection;
        self.store
            .get_document(collection, event_id.as_str())?
            .map(|doc| from_document(collection, event_id.as_str(), doc))
            .transpose()
    }

    /// Mirror documents of every participant published under `event_id`.
    ///
    /// # Errors
    /// Storage errors, or `CorruptDocument`.
    pub fn participant_documents(&self, event_id: &EventId) -> Result<Vec<ParticipantDocument>> {
        let collection = &self.config.participants_collection;
        self.store
            .query(collection, &[("event_id", Value::from(event_id.as_str()))])?
            .into_iter()
            .map(|doc| from_document(collection, &doc.key, doc.data))
            .collect()
    }
}

/// Store key for a raw email, or `None` if it cannot name a record.
fn record_key(email: &str) -> Option<String> {
    let key = normalize_email(email);
    if key.is_empty() || key.contains('/') {
        None
    } else {
        Some(key)
    }
}
