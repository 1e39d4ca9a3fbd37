//! Types shared between the DB and API layers.

pub mod election;
