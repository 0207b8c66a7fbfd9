//! Constrained random assignment generator.
//!
//! Takes a roster and an exclusion set and produces an [`Assignment`]
//! that is a permutation of the roster with no fixed points and no
//! excluded pairs. This is the **only** entry point MatchCore exposes. It
//! has no side effects and holds no state.
//!
//! ```text
//! generate(participants, exclusions) -> Assignment | InfeasibleMatching
//! ```
//!
//! ## Strategies
//!
//! - [`MatchStrategy::RandomRetry`]: shuffle receivers, greedily hand each
//!   giver the first unused receiver that is not themselves, then check
//!   exclusions. Any failure discards the whole attempt. Adequate when
//!   exclusions are sparse relative to the roster.
//! - [`MatchStrategy::Backtracking`]: randomized depth-first search that
//!   only ever tries allowed receivers. Finds an assignment whenever one
//!   exists, unless the step budget runs out first.
//!
//! Neither strategy can tell "no assignment exists" from "none found within
//! the budget"; both report [`GiftmatchError::InfeasibleMatching`].

use std::collections::HashSet;

use giftmatch_types::{
    Assignment, ExclusionSet, GiftmatchError, MatchStrategy, MatcherConfig, Participant,
    ParticipantId, Result,
};
use rand::Rng;

/// Generate an assignment using the thread-local RNG.
///
/// Every call may return a different valid assignment.
///
/// # Errors
/// - `TooFewParticipants` if the roster is smaller than
///   `config.min_participants`
/// - `DuplicateParticipant` if an id appears twice
/// - `InfeasibleMatching` if no assignment was found
pub fn generate(
    participants: &[Participant],
    exclusions: &ExclusionSet,
    config: &MatcherConfig,
) -> Result<Assignment> {
    generate_with_rng(participants, exclusions, config, &mut rand::thread_rng())
}

/// Generate an assignment drawing randomness from `rng`.
///
/// Seeding `rng` makes the result reproducible, which is what tests use.
///
/// # Errors
/// Same as [`generate`].
pub fn generate_with_rng<R: Rng + ?Sized>(
    participants: &[Participant],
    exclusions: &ExclusionSet,
    config: &MatcherConfig,
    rng: &mut R,
) -> Result<Assignment> {
    let givers = checked_ids(participants, config.min_participants)?;

    let result = match config.strategy {
        MatchStrategy::RandomRetry => random_retry(&givers, exclusions, config.max_attempts, rng),
        MatchStrategy::Backtracking => {
            backtracking(&givers, exclusions, config.backtrack_step_budget, rng)
        }
    };

    match &result {
        Ok(assignment) => tracing::info!(
            participants = givers.len(),
            exclusions = exclusions.len(),
            strategy = ?config.strategy,
            pairs = assignment.len(),
            "Assignment generated"
        ),
        Err(err) => tracing::warn!(
            participants = givers.len(),
            exclusions = exclusions.len(),
            strategy = ?config.strategy,
            error = %err,
            "Assignment generation failed"
        ),
    }
    result
}

/// Unbiased in-place Fisher–Yates shuffle: for `i` from the last index
/// down to 1, swap with a uniformly chosen index in `[0, i]`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Roster ids in input order, after the size and uniqueness preconditions.
fn checked_ids(participants: &[Participant], min_participants: usize) -> Result<Vec<ParticipantId>> {
    if participants.len() < min_participants {
        return Err(GiftmatchError::TooFewParticipants {
            required: min_participants,
            actual: participants.len(),
        });
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.id) {
            return Err(GiftmatchError::DuplicateParticipant(participant.id));
        }
    }
    Ok(participants.iter().map(|p| p.id).collect())
}

// ---------------------------------------------------------------------------
// RandomRetry
// ---------------------------------------------------------------------------

fn random_retry<R: Rng + ?Sized>(
    givers: &[ParticipantId],
    exclusions: &ExclusionSet,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Assignment> {
    let mut receivers = givers.to_vec();
    for attempt in 1..=max_attempts {
        fisher_yates(&mut receivers, rng);
        if let Some(assignment) = try_assignment(givers, &receivers, exclusions) {
            tracing::debug!(attempt, "Random attempt accepted");
            return Ok(assignment);
        }
    }
    Err(GiftmatchError::InfeasibleMatching {
        attempts: max_attempts,
    })
}

/// One greedy pass over a shuffled receiver sequence.
///
/// Each giver takes the first unused receiver that is not themselves. The
/// attempt is discarded if a giver is left with nobody or lands on an
/// excluded partner.
fn try_assignment(
    givers: &[ParticipantId],
    receivers: &[ParticipantId],
    exclusions: &ExclusionSet,
) -> Option<Assignment> {
    let mut used = vec![false; receivers.len()];
    let mut pairs = Vec::with_capacity(givers.len());

    for &giver in givers {
        let slot = (0..receivers.len()).find(|&j| !used[j] && receivers[j] != giver)?;
        let receiver = receivers[slot];
        if exclusions.forbids(giver, receiver) {
            return None;
        }
        used[slot] = true;
        pairs.push((giver, receiver));
    }

    // Every receiver consumed exactly once.
    if used.iter().all(|u| *u) && pairs.len() == givers.len() {
        Some(Assignment::from_pairs(pairs))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Backtracking
// ---------------------------------------------------------------------------

enum SearchEnd {
    Found,
    Exhausted,
    OutOfBudget,
}

struct Search<'a> {
    ids: &'a [ParticipantId],
    /// Allowed receiver indices per giver index, pre-shuffled.
    candidates: Vec<Vec<usize>>,
    /// Giver indices, most constrained first.
    order: Vec<usize>,
    used: Vec<bool>,
    chosen: Vec<Option<usize>>,
    steps: usize,
    budget: usize,
}

impl Search<'_> {
    fn run(&mut self, depth: usize) -> SearchEnd {
        if depth == self.order.len() {
            return SearchEnd::Found;
        }
        let giver = self.order[depth];
        for k in 0..self.candidates[giver].len() {
            let receiver = self.candidates[giver][k];
            if self.used[receiver] {
                continue;
            }
            self.steps += 1;
            if self.steps > self.budget {
                return SearchEnd::OutOfBudget;
            }
            self.used[receiver] = true;
            self.chosen[giver] = Some(receiver);
            match self.run(depth + 1) {
                SearchEnd::Exhausted => {}
                end => return end,
            }
            self.used[receiver] = false;
            self.chosen[giver] = None;
        }
        SearchEnd::Exhausted
    }

    fn assignment(&self) -> Option<Assignment> {
        self.chosen
            .iter()
            .enumerate()
            .map(|(g, r)| r.map(|r| (self.ids[g], self.ids[r])))
            .collect::<Option<Vec<_>>>()
            .map(Assignment::from_pairs)
    }
}

fn backtracking<R: Rng + ?Sized>(
    givers: &[ParticipantId],
    exclusions: &ExclusionSet,
    step_budget: usize,
    rng: &mut R,
) -> Result<Assignment> {
    let n = givers.len();
    let mut candidates: Vec<Vec<usize>> = givers
        .iter()
        .map(|&giver| {
            (0..n)
                .filter(|&r| givers[r] != giver && !exclusions.forbids(giver, givers[r]))
                .collect()
        })
        .collect();

    // A giver (or receiver) with no allowed partner makes the instance infeasible outright.
    let receivable = (0..n).all(|r| candidates.iter().any(|c| c.contains(&r)));
    if candidates.iter().any(Vec::is_empty) || !receivable {
        return Err(GiftmatchError::InfeasibleMatching { attempts: 0 });
    }

    for list in &mut candidates {
        fisher_yates(list, rng);
    }
    let mut order: Vec<usize> = (0..n).collect();
    fisher_yates(&mut order, rng);
    order.sort_by_key(|&g| candidates[g].len());

    let mut search = Search {
        ids: givers,
        candidates,
        order,
        used: vec![false; n],
        chosen: vec![None; n],
        steps: 0,
        budget: step_budget,
    };

    match search.run(0) {
        SearchEnd::Found => {
            tracing::debug!(steps = search.steps, "Backtracking search succeeded");
            search.assignment().ok_or_else(|| {
                GiftmatchError::Internal("backtracking left a giver unassigned".to_string())
            })
        }
        SearchEnd::Exhausted | SearchEnd::OutOfBudget => Err(GiftmatchError::InfeasibleMatching {
            attempts: search.steps,
        }),
    }
}
