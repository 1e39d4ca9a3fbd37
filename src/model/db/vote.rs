use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mongodb::bson::{serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::election::{CandidateId, ElectionId, PositionId},
    mongodb::Id,
};

/// A cast vote, as stored in the database.
///
/// Votes are append-only: the voting client inserts them at cast time and
/// they are never modified or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Unique ID.
    #[serde(rename = "_id")]
    pub id: Id,
    /// Foreign key election ID.
    pub election_id: ElectionId,
    /// Foreign key position ID.
    pub position_id: PositionId,
    /// The voter who cast this vote. Retained for the one-vote-per-position
    /// constraint; never exposed through the API.
    pub voter_id: Id,
    /// When the vote was cast.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
    /// The ballot payload, kept as the raw document the voting client
    /// wrote. Payloads are parsed into [`BallotData`] and validated only
    /// when tallied, so a malformed one degrades to a single invalid vote
    /// rather than a read error that would poison the whole results
    /// computation.
    #[serde(default)]
    pub data: Document,
}

/// The well-formed shape of a ballot payload.
///
/// Which fields are meaningful depends on the kind of the position voted
/// on; the tally engine checks that when it parses the stored payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotData {
    /// Explicit abstention marker.
    pub abstain: bool,
    /// Selected candidates, for single- and multiple-choice positions.
    pub selected: Vec<CandidateId>,
    /// Candidate per preference level, for ranked positions. Keys are
    /// decimal rank numbers kept as strings (BSON map keys are strings),
    /// parsed only at tally time so that a bad key is an invalid vote,
    /// not a deserialisation failure.
    pub rankings: BTreeMap<String, CandidateId>,
}
