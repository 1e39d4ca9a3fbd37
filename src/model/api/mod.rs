//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.
//! datetimes are serialised as RFC 3339 strings rather than BSON dates.

pub mod election;
pub mod results;
