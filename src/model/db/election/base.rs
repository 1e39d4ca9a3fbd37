use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::{CandidateId, ElectionId, PositionId, PositionKind},
    mongodb::{serde_string_map, Id},
};

use super::metadata::ElectionMetadata;

/// Core election data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Election {
    /// Unique ID.
    #[serde(rename = "_id")]
    pub id: ElectionId,
    /// Top-level metadata.
    #[serde(flatten)]
    pub metadata: ElectionMetadata,
    /// Positions up for election, with their candidates.
    #[serde(with = "serde_string_map")]
    pub positions: HashMap<PositionId, Position>,
}

impl Election {
    /// Get the given position if it exists.
    pub fn position(&self, position_id: PositionId) -> Option<&Position> {
        self.positions.get(&position_id)
    }

    /// All positions in definition order (IDs are assigned sequentially at
    /// creation, so ascending ID is creation order).
    pub fn positions_in_order(&self) -> Vec<&Position> {
        let mut positions = self.positions.values().collect::<Vec<_>>();
        positions.sort_by_key(|position| position.id);
        positions
    }
}

/// A single position up for election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Unique ID within the election.
    pub id: PositionId,
    /// Position name, e.g. "President".
    pub name: String,
    /// How votes for this position are cast and counted.
    pub kind: PositionKind,
    /// Upper bound on selections per ballot for multiple-choice positions.
    pub max_selection: Option<u32>,
    /// Number of preference levels for ranked positions.
    pub ranking_levels: Option<u32>,
    /// Whether voters may explicitly abstain.
    pub allow_abstain: bool,
    /// Candidates standing for this position.
    pub candidates: Vec<Candidate>,
}

impl Position {
    /// Candidates approved to stand for this position, in ID order.
    pub fn approved_candidates(&self) -> Vec<&Candidate> {
        let mut candidates = self
            .candidates
            .iter()
            .filter(|candidate| candidate.approved)
            .collect::<Vec<_>>();
        candidates.sort_by_key(|candidate| candidate.id);
        candidates
    }

    /// Look up a candidate by ID, if they exist and are approved.
    pub fn approved_candidate(&self, candidate_id: CandidateId) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|candidate| candidate.id == candidate_id && candidate.approved)
    }
}

/// A candidate standing for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique ID within the position.
    pub id: CandidateId,
    /// The user standing as this candidate.
    pub user_id: Id,
    /// Display name.
    pub name: String,
    /// Whether the admins have approved this candidacy.
    /// Unapproved candidates never appear in results.
    pub approved: bool,
}
