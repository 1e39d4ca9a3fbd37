mod kind;
mod state;

pub use kind::{ElectionKind, PositionKind};
pub use state::ElectionState;

/// Our election IDs are integers.
pub type ElectionId = u32;
/// Our position IDs are integers.
pub type PositionId = u32;
/// Our candidate IDs are integers, unique within their position.
pub type CandidateId = u32;
