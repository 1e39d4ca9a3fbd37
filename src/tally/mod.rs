//! The results engine.
//!
//! Pure functions from already-fetched election data to result trees; all
//! database access stays in the API layer. Re-running a tally over the same
//! data always produces the same results.

use std::collections::{BTreeMap, HashSet};

use crate::model::{
    api::results::{CandidateResult, ElectionResults, PositionResult},
    db::{
        election::{Election, Position},
        vote::Vote,
    },
};

mod ballot;
mod export;

pub use ballot::{BallotError, CheckedBallot};
pub use export::export_csv;

/// Tally every position of an election.
///
/// Votes that reference a position the election does not define are counted
/// into the election totals but tallied nowhere; positions nobody voted for
/// still appear in the results with all counts at zero.
pub fn tally_election(election: &Election, votes: &[Vote]) -> ElectionResults {
    let mut by_position: BTreeMap<_, Vec<&Vote>> = BTreeMap::new();
    let mut voters = HashSet::new();
    for vote in votes {
        voters.insert(vote.voter_id);
        if election.position(vote.position_id).is_some() {
            by_position.entry(vote.position_id).or_default().push(vote);
        } else {
            warn!(
                "Vote {} references unknown position {} of election {}",
                vote.id, vote.position_id, election.id
            );
        }
    }

    let positions = election
        .positions_in_order()
        .into_iter()
        .map(|position| {
            let position_votes = by_position.remove(&position.id).unwrap_or_default();
            tally_position(position, position_votes)
        })
        .collect();

    ElectionResults {
        id: election.id,
        title: election.metadata.title.clone(),
        kind: election.metadata.kind,
        total_votes: votes.len() as u64,
        unique_voters: voters.len() as u64,
        positions,
    }
}

/// Tally a single position.
pub fn tally_position<'a>(
    position: &Position,
    votes: impl IntoIterator<Item = &'a Vote>,
) -> PositionResult {
    let mut counts: BTreeMap<_, u64> = BTreeMap::new();
    let mut total_votes = 0;
    let mut valid_votes = 0;
    let mut abstentions = 0;
    let mut invalid_votes = 0;

    for vote in votes {
        total_votes += 1;
        match CheckedBallot::check(position, &vote.data) {
            Ok(CheckedBallot::Abstain) => abstentions += 1,
            Ok(CheckedBallot::Single(candidate)) => {
                valid_votes += 1;
                *counts.entry(candidate).or_default() += 1;
            }
            Ok(CheckedBallot::Multiple(candidates)) => {
                valid_votes += 1;
                for candidate in candidates {
                    *counts.entry(candidate).or_default() += 1;
                }
            }
            Ok(CheckedBallot::Ranked(candidates)) => {
                // First preferences only; full preference flows are out of
                // scope for this tally.
                valid_votes += 1;
                if let Some(&first) = candidates.first() {
                    *counts.entry(first).or_default() += 1;
                }
            }
            Err(err) => {
                invalid_votes += 1;
                warn!(
                    "Invalid vote {} for position {}: {}",
                    vote.id, position.id, err
                );
            }
        }
    }

    // Every approved candidate appears in the results, votes or not.
    let mut candidates = position
        .approved_candidates()
        .into_iter()
        .map(|candidate| {
            let votes = counts.get(&candidate.id).copied().unwrap_or(0);
            CandidateResult {
                id: candidate.id,
                name: candidate.name.clone(),
                votes,
                percentage: percentage(votes, valid_votes),
                rank: None,
            }
        })
        .collect::<Vec<_>>();

    // Most votes first; ties broken by candidate ID for a stable order.
    candidates.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.id.cmp(&b.id)));

    // Competition ranking: tied candidates share a rank and the ranks after
    // a tie are skipped, so counts of [10, 10, 5] rank as [1, 1, 3]. With no
    // valid votes there is nothing to rank by.
    if valid_votes > 0 {
        let mut rank = 0;
        let mut previous = None;
        for (index, candidate) in candidates.iter_mut().enumerate() {
            if previous != Some(candidate.votes) {
                rank = index as u32 + 1;
                previous = Some(candidate.votes);
            }
            candidate.rank = Some(rank);
        }
    }

    PositionResult {
        id: position.id,
        name: position.name.clone(),
        total_votes,
        valid_votes,
        abstentions,
        invalid_votes,
        candidates,
    }
}

/// A candidate's share of the valid votes, as a percentage rounded to one
/// decimal place. Zero (rather than a division by zero) when there are no
/// valid votes.
fn percentage(votes: u64, valid_votes: u64) -> f64 {
    if valid_votes == 0 {
        return 0.0;
    }
    let raw = votes as f64 / valid_votes as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
