mod base;
mod metadata;

pub use base::{Candidate, Election, Position};
pub use metadata::ElectionMetadata;
