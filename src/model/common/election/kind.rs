use serde::{Deserialize, Serialize};

/// The overall style of an election, as presented to voters.
///
/// This is display metadata: referendums and polls tally exactly like
/// candidate elections, via the `PositionKind` of each position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionKind {
    /// One choice per position.
    Single,
    /// Several choices per position.
    Multiple,
    /// Preference-ordered choices per position.
    Ranked,
    /// Yes/no (or similar) questions instead of candidates.
    Referendum,
    /// Non-binding opinion poll.
    Poll,
}

/// How votes for a single position are cast and counted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    /// Exactly one candidate per ballot.
    Single,
    /// Up to `max_selection` candidates per ballot.
    Multiple,
    /// Candidates in preference order per ballot.
    Ranked,
}
