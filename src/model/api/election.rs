use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::{CandidateId, ElectionId, ElectionKind, ElectionState, PositionId, PositionKind},
    db::election::{Candidate, Election, Position},
};

/// A summary of an election, shorter than the full `ElectionDescription`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// The overall voting style.
    pub kind: ElectionKind,
    /// Election state.
    pub state: ElectionState,
    /// Election start time.
    pub start_time: DateTime<Utc>,
    /// Election end time.
    pub end_time: DateTime<Utc>,
}

impl From<Election> for ElectionSummary {
    fn from(election: Election) -> Self {
        Self {
            id: election.id,
            title: election.metadata.title,
            kind: election.metadata.kind,
            state: election.metadata.state,
            start_time: election.metadata.start_time,
            end_time: election.metadata.end_time,
        }
    }
}

/// An API-friendly election description: metadata plus positions in
/// definition order, including candidacies awaiting approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    /// Election unique ID.
    pub id: ElectionId,
    /// Election title.
    pub title: String,
    /// The overall voting style.
    pub kind: ElectionKind,
    /// Election state.
    pub state: ElectionState,
    /// Election start time.
    pub start_time: DateTime<Utc>,
    /// Election end time.
    pub end_time: DateTime<Utc>,
    /// Positions up for election.
    pub positions: Vec<PositionDescription>,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        let positions = election
            .positions_in_order()
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect();
        Self {
            id: election.id,
            title: election.metadata.title,
            kind: election.metadata.kind,
            state: election.metadata.state,
            start_time: election.metadata.start_time,
            end_time: election.metadata.end_time,
            positions,
        }
    }
}

/// A position as presented in the election detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDescription {
    /// Position unique ID within the election.
    pub id: PositionId,
    /// Position name.
    pub name: String,
    /// How votes for this position are cast and counted.
    pub kind: PositionKind,
    /// Upper bound on selections per ballot for multiple-choice positions.
    pub max_selection: Option<u32>,
    /// Number of preference levels for ranked positions.
    pub ranking_levels: Option<u32>,
    /// Whether voters may explicitly abstain.
    pub allow_abstain: bool,
    /// Candidates standing for this position, approved or not.
    pub candidates: Vec<CandidateDescription>,
}

impl From<Position> for PositionDescription {
    fn from(position: Position) -> Self {
        let mut candidates = position
            .candidates
            .into_iter()
            .map(CandidateDescription::from)
            .collect::<Vec<_>>();
        candidates.sort_by_key(|candidate| candidate.id);
        Self {
            id: position.id,
            name: position.name,
            kind: position.kind,
            max_selection: position.max_selection,
            ranking_levels: position.ranking_levels,
            allow_abstain: position.allow_abstain,
            candidates,
        }
    }
}

/// A candidate as presented in the election detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    /// Candidate unique ID within the position.
    pub id: CandidateId,
    /// Display name.
    pub name: String,
    /// Whether the candidacy has been approved.
    pub approved: bool,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            approved: candidate.approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_keep_definition_order_and_hide_nothing() {
        let description = ElectionDescription::from(Election::published_example());

        let position_ids = description
            .positions
            .iter()
            .map(|position| position.id)
            .collect::<Vec<_>>();
        assert_eq!(position_ids, vec![1, 2, 3]);

        // The admin detail view includes unapproved candidacies.
        let president = &description.positions[0];
        assert_eq!(president.candidates.len(), 4);
        assert!(!president.candidates[3].approved);
    }

    #[test]
    fn summaries_carry_the_metadata() {
        let election = Election::draft_example();
        let expected = election.metadata.clone();
        let summary = ElectionSummary::from(election);
        assert_eq!(summary.title, expected.title);
        assert_eq!(summary.kind, expected.kind);
        assert_eq!(summary.state, expected.state);
        assert_eq!(summary.start_time, expected.start_time);
        assert_eq!(summary.end_time, expected.end_time);
    }

    #[test]
    fn voter_ids_never_appear_in_descriptions() {
        let description = ElectionDescription::from(Election::archived_example());
        let json = rocket::serde::json::serde_json::to_string(&description).unwrap();
        assert!(!json.contains("user_id"));
        assert!(!json.contains("voter_id"));
    }
}
