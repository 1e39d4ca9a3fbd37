use serde::{Deserialize, Serialize};

use crate::model::common::election::{CandidateId, ElectionId, ElectionKind, PositionId};

/// The full results of an election: one entry per position, in definition
/// order, plus election-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResults {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// The overall voting style.
    pub kind: ElectionKind,
    /// Every vote cast in this election, whatever its fate at tally time.
    pub total_votes: u64,
    /// Number of distinct voters who cast at least one vote.
    pub unique_voters: u64,
    /// Per-position results.
    pub positions: Vec<PositionResult>,
}

/// The tally for a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionResult {
    /// Position unique ID within the election.
    pub id: PositionId,
    /// Position name.
    pub name: String,
    /// Every vote cast for this position.
    pub total_votes: u64,
    /// Votes that named at least one candidate and passed validation.
    pub valid_votes: u64,
    /// Explicit abstentions.
    pub abstentions: u64,
    /// Votes rejected at validation.
    pub invalid_votes: u64,
    /// Per-candidate standings, best first.
    pub candidates: Vec<CandidateResult>,
}

/// One candidate's standing within a position result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Candidate unique ID within the position.
    pub id: CandidateId,
    /// Display name.
    pub name: String,
    /// Valid votes counted for this candidate.
    pub votes: u64,
    /// Share of the position's valid votes, as a percentage rounded to one
    /// decimal place. Zero when the position received no valid votes.
    pub percentage: f64,
    /// Competition rank ("1224" style: tied candidates share a rank and the
    /// next rank is skipped). `None` when the position received no valid
    /// votes, since there is no meaningful ordering to rank by.
    pub rank: Option<u32>,
}
