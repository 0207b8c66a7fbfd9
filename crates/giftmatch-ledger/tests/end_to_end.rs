//! End-to-end integration tests across the organizer and reveal planes.
//!
//! These tests exercise the full exchange lifecycle:
//! roster (`ExchangeState`) -> `MatchCore` draw -> remote publish -> reveal
//!
//! They check the planes together in realistic scenarios: exclusions,
//! participants without email, repeat and concurrent reveals,
//! re-publishing, store outages and session snapshots.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use giftmatch_ledger::{FailoverLedger, InMemoryStore, RemoteLedger, RevealLedger};
use giftmatch_roster::{DrawReceipt, ExchangeState, OrganizerGate, PasscodeVerifier, run_draw};
use giftmatch_types::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Helper: one organizer session wired to a shared in-memory store.
struct Exchange {
    state: ExchangeState,
    store: Arc<InMemoryStore>,
    ledger: RemoteLedger<Arc<InMemoryStore>>,
    gate: OrganizerGate,
    rng: StdRng,
}

impl Exchange {
    fn new(seed: u64) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryStore::new());
        let mut state = ExchangeState::new();
        state
            .set_event(EventDetails {
                organizer_name: "Office Party".into(),
                budget: BudgetRange::new(Decimal::new(25, 0), Decimal::new(40, 0)).unwrap(),
                message: "Wrap it nicely".into(),
                ..EventDetails::default()
            })
            .unwrap();
        Self {
            state,
            ledger: RemoteLedger::new(Arc::clone(&store), LedgerConfig::default()),
            store,
            gate: OrganizerGate::new(PasscodeVerifier::from_passcode("north-pole")),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn add(&mut self, name: &str, email: Option<&str>) -> ParticipantId {
        self.state
            .add_participant(name, email, &format!("{name}'s wishlist"))
            .expect("participant should be valid")
    }

    fn add_all(&mut self, names: &[&str]) -> Vec<ParticipantId> {
        names
            .iter()
            .map(|n| {
                let email = format!("{}@example.com", n.to_lowercase());
                self.add(n, Some(&email))
            })
            .collect()
    }

    fn draw(&mut self) -> Result<DrawReceipt> {
        let session = self.gate.open("north-pole")?;
        run_draw(&mut self.state, &session, &MatcherConfig::default(), &mut self.rng)
    }

    fn publish(&self) -> Result<giftmatch_ledger::PublishReport> {
        let event_id = self.state.event_id().ok_or(GiftmatchError::NoAssignment)?;
        let assignment = self.state.assignment().ok_or(GiftmatchError::NoAssignment)?;
        self.ledger
            .publish(event_id, self.state.event(), assignment, self.state.participants())
    }

    fn event_id(&self) -> EventId {
        self.state.event_id().cloned().expect("draw has run")
    }

    fn name_of(&self, id: ParticipantId) -> &str {
        &self.state.participant(id).expect("known participant").name
    }
}

// ---------------------------------------------------------------------------
// Draw + publish + reveal
// ---------------------------------------------------------------------------

#[test]
fn e2e_four_people_one_exclusion() {
    for seed in 0..50 {
        let mut ex = Exchange::new(seed);
        let ids = ex.add_all(&["A", "B", "C", "D"]);
        ex.state.add_exclusion(ids[0], ids[1]).unwrap();
        ex.draw().unwrap();

        let assignment = ex.state.assignment().unwrap();
        let receivers: HashSet<_> = assignment.iter().map(|(_, r)| r).collect();
        assert_eq!(receivers.len(), 4, "not a bijection");
        for (giver, receiver) in assignment.iter() {
            assert_ne!(giver, receiver);
        }
        assert_ne!(assignment.receiver_of(ids[0]), Some(ids[1]));
        assert_ne!(assignment.receiver_of(ids[1]), Some(ids[0]));
    }
}

#[test]
fn e2e_every_participant_reveals_their_match() {
    let mut ex = Exchange::new(7);
    let ids = ex.add_all(&["Ann", "Ben", "Cat", "Dee", "Eve"]);
    ex.state.add_exclusion(ids[0], ids[1]).unwrap();
    ex.state.add_exclusion(ids[2], ids[3]).unwrap();
    let receipt = ex.draw().unwrap();
    let report = ex.publish().unwrap();
    assert_eq!(report.records, 5);
    assert_eq!(report.assignment_digest, receipt.digest);

    let event_id = ex.event_id();
    for &giver in &ids {
        let email = ex.state.participant(giver).unwrap().email.clone().unwrap();
        let outcome = ex.ledger.reveal(&event_id, email.as_str()).unwrap();
        let record = outcome.record().unwrap();

        let receiver = ex.state.assignment().unwrap().receiver_of(giver).unwrap();
        assert!(outcome.is_first_reveal());
        assert_eq!(record.giver_name, ex.name_of(giver));
        assert_eq!(record.match_name, ex.name_of(receiver));
        assert_eq!(record.match_wishlist, format!("{}'s wishlist", ex.name_of(receiver)));
        assert_eq!(record.budget.to_string(), "25-40");
    }

    let status = ex.ledger.status(&event_id).unwrap();
    assert_eq!(status, RevealStatus { total: 5, revealed: 5 });
    let mirrors = ex.ledger.participant_documents(&event_id).unwrap();
    assert!(mirrors.iter().all(|m| m.is_revealed));
}

#[test]
fn e2e_reveal_twice() {
    let mut ex = Exchange::new(3);
    ex.add_all(&["Ann", "Ben", "Cat"]);
    ex.draw().unwrap();
    ex.publish().unwrap();
    let event_id = ex.event_id();

    let first = ex.ledger.reveal(&event_id, "ben@example.com").unwrap();
    let second = ex.ledger.reveal(&event_id, "ben@example.com").unwrap();
    assert!(matches!(first, RevealOutcome::Revealed(_)));
    assert!(matches!(second, RevealOutcome::AlreadyRevealed(_)));
    assert_eq!(first.record().unwrap().match_name, second.record().unwrap().match_name);
    assert!(ex.ledger.lookup(&event_id, "ben@example.com").unwrap().unwrap().revealed);
}

#[test]
fn e2e_concurrent_reveals_have_one_winner() {
    const CLIENTS: usize = 16;

    let mut ex = Exchange::new(11);
    ex.add_all(&["Ann", "Ben", "Cat", "Dee"]);
    ex.draw().unwrap();
    ex.publish().unwrap();
    let event_id = ex.event_id();

    let ledger = Arc::new(RemoteLedger::new(Arc::clone(&ex.store), LedgerConfig::default()));
    let barrier = Arc::new(Barrier::new(CLIENTS));
    let handles: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            let event_id = event_id.clone();
            // Every client types the address a little differently.
            let email = if i % 2 == 0 { " CAT@example.com" } else { "cat@example.com " };
            thread::spawn(move || {
                barrier.wait();
                ledger.reveal(&event_id, email).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = outcomes.iter().filter(|o| o.is_first_reveal()).count();
    let repeats = outcomes
        .iter()
        .filter(|o| matches!(o, RevealOutcome::AlreadyRevealed(_)))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(repeats, CLIENTS - 1);
    assert_eq!(ledger.status(&event_id).unwrap().revealed, 1);
}

#[test]
fn e2e_concurrent_reveals_of_different_people() {
    let mut ex = Exchange::new(12);
    let names = ["Ann", "Ben", "Cat", "Dee", "Eve", "Fay"];
    ex.add_all(&names);
    ex.draw().unwrap();
    ex.publish().unwrap();
    let event_id = ex.event_id();

    let ledger = Arc::new(RemoteLedger::new(Arc::clone(&ex.store), LedgerConfig::default()));
    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let ledger = Arc::clone(&ledger);
            let event_id = event_id.clone();
            let email = format!("{}@example.com", name.to_lowercase());
            thread::spawn(move || ledger.reveal(&event_id, &email).unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_first_reveal());
    }
    assert_eq!(ledger.status(&event_id).unwrap().pending(), 0);
}

// ---------------------------------------------------------------------------
// Publish shape
// ---------------------------------------------------------------------------

#[test]
fn e2e_participant_without_email_is_still_a_match() {
    init_tracing();
    let a = Participant::new("A", Some("a@x.com"), "").unwrap();
    let b = Participant::new("B", Some("b@x.com"), "").unwrap();
    let c = Participant::new("C", Some("  "), "tea").unwrap();
    let d = Participant::new("D", Some("d@x.com"), "").unwrap();
    assert!(!c.has_email());

    let assignment = Assignment::from_pairs([(a.id, c.id), (b.id, d.id), (c.id, a.id), (d.id, b.id)]);
    let roster = vec![a, b, c, d];
    let ledger = RemoteLedger::new(InMemoryStore::new(), LedgerConfig::default());
    let event_id = EventId::new("E1");

    let report = ledger
        .publish(&event_id, &EventDetails::default(), &assignment, &roster)
        .unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.without_email, 1);

    let a_record = ledger.lookup(&event_id, "a@x.com").unwrap().unwrap();
    assert_eq!(a_record.match_name, "C");
    assert_eq!(a_record.match_wishlist, "tea");
    assert_eq!(ledger.status(&event_id).unwrap().total, 3);
}

#[test]
fn e2e_lookup_normalizes_email() {
    init_tracing();
    let roster: Vec<_> = ["a@x.com", "b@x.com", "c@x.com"]
        .iter()
        .enumerate()
        .map(|(i, email)| Participant::new(&format!("P{i}"), Some(email), "").unwrap())
        .collect();
    let assignment = Assignment::from_pairs([
        (roster[0].id, roster[1].id),
        (roster[1].id, roster[2].id),
        (roster[2].id, roster[0].id),
    ]);
    let ledger = RemoteLedger::new(InMemoryStore::new(), LedgerConfig::default());
    let event_id = EventId::new("E1");
    ledger
        .publish(&event_id, &EventDetails::default(), &assignment, &roster)
        .unwrap();

    assert!(ledger.lookup(&event_id, "nonexistent@x.com").unwrap().is_none());
    let messy = ledger.lookup(&event_id, "  A@X.com ").unwrap();
    let clean = ledger.lookup(&event_id, "a@x.com").unwrap();
    assert!(messy.is_some());
    assert_eq!(messy, clean);
}

#[test]
fn e2e_republish_replaces_records() {
    let mut ex = Exchange::new(21);
    let ids = ex.add_all(&["Ann", "Ben", "Cat", "Dee"]);
    let first = ex.draw().unwrap();
    ex.publish().unwrap();
    ex.ledger.reveal(&first.event_id, "ann@example.com").unwrap();

    // Dee leaves; the draw is discarded and redone for the same event.
    ex.state.remove_participant(ids[3]).unwrap();
    assert!(ex.state.assignment().is_none());
    let second = ex.draw().unwrap();
    assert_eq!(second.event_id, first.event_id);

    let report = ex.publish().unwrap();
    assert_eq!(report.records, 3);
    // Dee's record and Dee's mirror document.
    assert_eq!(report.stale_removed, 2);

    let event_id = ex.event_id();
    assert!(ex.ledger.lookup(&event_id, "dee@example.com").unwrap().is_none());
    assert_eq!(ex.ledger.participant_documents(&event_id).unwrap().len(), 3);
    // Fresh records start unrevealed.
    assert_eq!(ex.ledger.status(&event_id).unwrap(), RevealStatus { total: 3, revealed: 0 });
    let published = ex.ledger.published_event(&event_id).unwrap().unwrap();
    assert_eq!(published.assignment_digest, second.digest);
}

#[test]
fn e2e_failed_publish_commits_nothing() {
    let mut ex = Exchange::new(5);
    ex.add_all(&["Ann", "Ben", "Cat"]);
    ex.draw().unwrap();

    ex.store.fail_next_write();
    let err = ex.publish().unwrap_err();
    assert!(matches!(err, GiftmatchError::StorageWriteFailed { .. }));

    let event_id = ex.event_id();
    assert!(ex.ledger.published_event(&event_id).unwrap().is_none());
    assert_eq!(ex.ledger.status(&event_id).unwrap().total, 0);

    ex.publish().unwrap();
    assert_eq!(ex.ledger.status(&event_id).unwrap().total, 3);
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn e2e_complete_exclusions_never_publish() {
    let mut ex = Exchange::new(1);
    let ids = ex.add_all(&["Ann", "Ben", "Cat", "Dee"]);
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            ex.state.add_exclusion(a, b).unwrap();
        }
    }
    let err = ex.draw().unwrap_err();
    assert!(matches!(err, GiftmatchError::InfeasibleMatching { attempts: 1000 }));
    assert!(matches!(ex.publish(), Err(GiftmatchError::NoAssignment)));
}

#[test]
fn e2e_wrong_passcode_cannot_draw() {
    let mut ex = Exchange::new(2);
    ex.add_all(&["Ann", "Ben", "Cat"]);
    assert!(matches!(ex.gate.open("south-pole"), Err(GiftmatchError::Unauthorized)));
    assert!(ex.state.assignment().is_none());
}

#[test]
fn e2e_outage_falls_back_to_saved_session() {
    let mut ex = Exchange::new(9);
    ex.add_all(&["Ann", "Ben", "Cat", "Dee"]);
    ex.draw().unwrap();
    ex.publish().unwrap();
    let event_id = ex.event_id();

    // The organizer's session is saved and later restored on another run.
    let saved = ex.state.to_json().unwrap();
    let mut restored = ExchangeState::from_json(&saved).unwrap();

    ex.store.set_offline(true);
    let mut client = FailoverLedger::new(&ex.ledger, &mut restored);
    let outcome = client.reveal(&event_id, "DEE@example.com").unwrap();
    assert!(outcome.is_first_reveal());
    let again = client.reveal(&event_id, "dee@example.com").unwrap();
    assert!(matches!(again, RevealOutcome::AlreadyRevealed(_)));
    assert_eq!(client.status(&event_id).unwrap(), RevealStatus { total: 4, revealed: 1 });

    // Local answers agree with what the store would have said.
    ex.store.set_offline(false);
    let remote_record = ex.ledger.lookup(&event_id, "dee@example.com").unwrap().unwrap();
    assert_eq!(remote_record.match_name, outcome.record().unwrap().match_name);
    assert!(!remote_record.revealed);
}
