#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

use rocket::{Build, Rocket};

use crate::config::DatabaseFairing;
use crate::logging::RequestLogger;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod tally;

/// Assemble the server: routes, catchers, and fairings. The database
/// connection itself is made at ignition by the [`DatabaseFairing`].
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(RequestLogger)
        .attach(DatabaseFairing)
}
