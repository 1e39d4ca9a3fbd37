use std::collections::HashSet;

use mongodb::bson::{from_document, Document};

use crate::model::{
    common::election::{CandidateId, PositionKind},
    db::{election::Position, vote::BallotData},
};

/// A ballot payload that has passed validation against its position.
///
/// Validation happens here, at tally time, rather than at cast time: the
/// stored payloads are untrusted, and a vote whose payload does not parse
/// or fails any check below is counted as invalid instead of aborting the
/// tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckedBallot {
    /// An explicit abstention.
    Abstain,
    /// A vote for a single candidate.
    Single(CandidateId),
    /// A vote for several candidates at once.
    Multiple(Vec<CandidateId>),
    /// A ranked vote, candidates ordered by preference (best first).
    Ranked(Vec<CandidateId>),
}

/// The ways a ballot payload can fail validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BallotError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("abstention is not allowed for this position")]
    AbstainNotAllowed,
    #[error("abstention combined with candidate selections")]
    AbstainWithSelections,
    #[error("the ballot names no candidates")]
    Empty,
    #[error("expected exactly one selection, got {0}")]
    NotExactlyOne(usize),
    #[error("{got} selections exceeds the limit of {max}")]
    TooManySelections { got: usize, max: u32 },
    #[error("candidate {0} appears more than once")]
    DuplicateCandidate(CandidateId),
    #[error("candidate {0} is not standing for this position")]
    UnknownCandidate(CandidateId),
    #[error("invalid rank {0:?}")]
    InvalidRank(String),
    #[error("rank {rank} is outside the {levels} preference levels")]
    RankOutOfRange { rank: u32, levels: u32 },
    #[error("more than one candidate at rank {0}")]
    DuplicateRank(u32),
    #[error("this position takes rankings, not selections")]
    UnexpectedSelections,
    #[error("this position takes selections, not rankings")]
    UnexpectedRankings,
}

impl CheckedBallot {
    /// Validate a raw stored payload against the position it was cast for.
    pub fn check(position: &Position, data: &Document) -> Result<Self, BallotError> {
        let data: BallotData = from_document(data.clone())
            .map_err(|err| BallotError::MalformedPayload(err.to_string()))?;

        if data.abstain {
            if !data.selected.is_empty() || !data.rankings.is_empty() {
                return Err(BallotError::AbstainWithSelections);
            }
            if !position.allow_abstain {
                return Err(BallotError::AbstainNotAllowed);
            }
            return Ok(Self::Abstain);
        }

        match position.kind {
            PositionKind::Single => {
                if !data.rankings.is_empty() {
                    return Err(BallotError::UnexpectedRankings);
                }
                let candidate = match data.selected.as_slice() {
                    [] => return Err(BallotError::Empty),
                    [candidate] => *candidate,
                    more => return Err(BallotError::NotExactlyOne(more.len())),
                };
                check_standing(position, candidate)?;
                Ok(Self::Single(candidate))
            }

            PositionKind::Multiple => {
                if !data.rankings.is_empty() {
                    return Err(BallotError::UnexpectedRankings);
                }
                if data.selected.is_empty() {
                    return Err(BallotError::Empty);
                }
                if let Some(max) = position.max_selection {
                    if data.selected.len() > max as usize {
                        return Err(BallotError::TooManySelections {
                            got: data.selected.len(),
                            max,
                        });
                    }
                }
                let mut seen = HashSet::new();
                for &candidate in &data.selected {
                    if !seen.insert(candidate) {
                        return Err(BallotError::DuplicateCandidate(candidate));
                    }
                    check_standing(position, candidate)?;
                }
                Ok(Self::Multiple(data.selected))
            }

            PositionKind::Ranked => {
                if !data.selected.is_empty() {
                    return Err(BallotError::UnexpectedSelections);
                }
                if data.rankings.is_empty() {
                    return Err(BallotError::Empty);
                }
                // Rank keys are stored as strings; parse and re-check
                // uniqueness since e.g. "1" and "01" are distinct keys.
                let mut ranked = Vec::with_capacity(data.rankings.len());
                let mut ranks = HashSet::new();
                let mut candidates = HashSet::new();
                for (key, &candidate) in &data.rankings {
                    let rank: u32 = key
                        .parse()
                        .ok()
                        .filter(|&rank| rank >= 1)
                        .ok_or_else(|| BallotError::InvalidRank(key.clone()))?;
                    if let Some(levels) = position.ranking_levels {
                        if rank > levels {
                            return Err(BallotError::RankOutOfRange { rank, levels });
                        }
                    }
                    if !ranks.insert(rank) {
                        return Err(BallotError::DuplicateRank(rank));
                    }
                    if !candidates.insert(candidate) {
                        return Err(BallotError::DuplicateCandidate(candidate));
                    }
                    check_standing(position, candidate)?;
                    ranked.push((rank, candidate));
                }
                ranked.sort_by_key(|&(rank, _)| rank);
                Ok(Self::Ranked(
                    ranked.into_iter().map(|(_, candidate)| candidate).collect(),
                ))
            }
        }
    }
}

/// A candidate only counts if they are in the running and approved.
fn check_standing(position: &Position, candidate: CandidateId) -> Result<(), BallotError> {
    position
        .approved_candidate(candidate)
        .map(|_| ())
        .ok_or(BallotError::UnknownCandidate(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(position: &Position, data: BallotData) -> Result<CheckedBallot, BallotError> {
        let doc = mongodb::bson::to_document(&data).unwrap();
        CheckedBallot::check(position, &doc)
    }

    #[test]
    fn wrongly_typed_payloads_are_malformed_ballots() {
        let position = Position::president_example();
        let garbled = mongodb::bson::doc! { "selected": ["banana"] };
        assert!(matches!(
            CheckedBallot::check(&position, &garbled),
            Err(BallotError::MalformedPayload(_))
        ));
    }

    #[test]
    fn single_choice_accepts_exactly_one_approved_candidate() {
        let position = Position::president_example();
        assert_eq!(
            check(&position, BallotData::single(2)),
            Ok(CheckedBallot::Single(2))
        );
    }

    #[test]
    fn single_choice_rejects_wrong_cardinality() {
        let position = Position::president_example();
        assert_eq!(
            check(&position, BallotData::default()),
            Err(BallotError::Empty)
        );
        assert_eq!(
            check(&position, BallotData::multiple([1, 2])),
            Err(BallotError::NotExactlyOne(2))
        );
    }

    #[test]
    fn unknown_and_unapproved_candidates_are_rejected() {
        let position = Position::president_example();
        assert_eq!(
            check(&position, BallotData::single(42)),
            Err(BallotError::UnknownCandidate(42))
        );
        // Candidate 4 exists but was never approved.
        assert_eq!(
            check(&position, BallotData::single(4)),
            Err(BallotError::UnknownCandidate(4))
        );
    }

    #[test]
    fn abstention_requires_permission_and_an_otherwise_empty_ballot() {
        let president = Position::president_example();
        assert_eq!(
            check(&president, BallotData::abstention()),
            Ok(CheckedBallot::Abstain)
        );

        let no_abstain = Position::welfare_example();
        assert_eq!(
            check(&no_abstain, BallotData::abstention()),
            Err(BallotError::AbstainNotAllowed)
        );

        let mut mixed = BallotData::single(1);
        mixed.abstain = true;
        assert_eq!(
            check(&president, mixed),
            Err(BallotError::AbstainWithSelections)
        );
    }

    #[test]
    fn multiple_choice_enforces_the_selection_limit() {
        let position = Position::welfare_example();
        assert_eq!(
            check(&position, BallotData::multiple([1, 3])),
            Ok(CheckedBallot::Multiple(vec![1, 3]))
        );
        assert_eq!(
            check(&position, BallotData::multiple([1, 2, 3])),
            Err(BallotError::TooManySelections { got: 3, max: 2 })
        );
    }

    #[test]
    fn multiple_choice_rejects_duplicates() {
        let position = Position::welfare_example();
        assert_eq!(
            check(&position, BallotData::multiple([2, 2])),
            Err(BallotError::DuplicateCandidate(2))
        );
    }

    #[test]
    fn unlimited_selections_when_no_maximum_is_set() {
        let mut position = Position::welfare_example();
        position.max_selection = None;
        assert_eq!(
            check(&position, BallotData::multiple([1, 2, 3])),
            Ok(CheckedBallot::Multiple(vec![1, 2, 3]))
        );
    }

    #[test]
    fn ranked_ballots_come_back_in_preference_order() {
        let position = Position::social_sec_example();
        // Submitted with ranks out of order.
        assert_eq!(
            check(&position, BallotData::ranked([(3, 1), (1, 2), (2, 3)])),
            Ok(CheckedBallot::Ranked(vec![2, 3, 1]))
        );
    }

    #[test]
    fn partial_rankings_are_fine() {
        let position = Position::social_sec_example();
        assert_eq!(
            check(&position, BallotData::ranked([(1, 3)])),
            Ok(CheckedBallot::Ranked(vec![3]))
        );
    }

    #[test]
    fn ranked_ballots_reject_bad_ranks() {
        let position = Position::social_sec_example();
        assert_eq!(
            check(&position, BallotData::ranked([(0, 1)])),
            Err(BallotError::InvalidRank("0".to_string()))
        );
        assert_eq!(
            check(&position, BallotData::ranked([(4, 1)])),
            Err(BallotError::RankOutOfRange { rank: 4, levels: 3 })
        );

        let mut garbled = BallotData::ranked([(1, 1)]);
        garbled.rankings.insert("first".to_string(), 2);
        assert_eq!(
            check(&position, garbled),
            Err(BallotError::InvalidRank("first".to_string()))
        );
    }

    #[test]
    fn ranked_ballots_reject_duplicate_ranks_and_candidates() {
        let position = Position::social_sec_example();

        // "01" and "1" are distinct map keys but the same rank.
        let mut sneaky = BallotData::ranked([(1, 1)]);
        sneaky.rankings.insert("01".to_string(), 2);
        assert_eq!(check(&position, sneaky), Err(BallotError::DuplicateRank(1)));

        assert_eq!(
            check(&position, BallotData::ranked([(1, 2), (2, 2)])),
            Err(BallotError::DuplicateCandidate(2))
        );
    }

    #[test]
    fn payload_shape_must_match_the_position_kind() {
        let single = Position::president_example();
        let ranked = Position::social_sec_example();
        assert_eq!(
            check(&single, BallotData::ranked([(1, 1)])),
            Err(BallotError::UnexpectedRankings)
        );
        assert_eq!(
            check(&ranked, BallotData::single(1)),
            Err(BallotError::UnexpectedSelections)
        );
        assert_eq!(check(&ranked, BallotData::default()), Err(BallotError::Empty));
    }
}
