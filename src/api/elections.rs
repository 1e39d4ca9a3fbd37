use mongodb::bson::{doc, Document};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::election::{ElectionDescription, ElectionSummary},
    common::election::{ElectionId, ElectionState},
    db::election::Election,
    mongodb::{u32_id_filter, Coll},
};

pub fn routes() -> Vec<Route> {
    routes![elections, election]
}

/// List elections. Live elections (draft or published) by default, archived
/// ones on request.
#[get("/elections?<archived>")]
async fn elections(
    archived: Option<bool>,
    elections: Coll<Election>,
) -> Result<Json<Vec<ElectionSummary>>> {
    let filter = state_filter(archived.unwrap_or(false));
    let elections = elections
        .find(filter, None)
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    let summaries = elections.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}

/// A single election in full, positions and candidates included.
#[get("/elections/<election_id>")]
async fn election(
    election_id: ElectionId,
    elections: Coll<Election>,
) -> Result<Json<ElectionDescription>> {
    let election = elections
        .find_one(u32_id_filter(election_id), None)
        .await?
        .ok_or_else(|| Error::not_found("Election"))?;

    Ok(Json(election.into()))
}

fn state_filter(archived: bool) -> Document {
    if archived {
        doc! {
            "state": ElectionState::Archived,
        }
    } else {
        doc! {
            "$or": [{"state": ElectionState::Draft}, {"state": ElectionState::Published}],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archived_elections_are_hidden_unless_asked_for() {
        assert_eq!(
            state_filter(true),
            doc! { "state": "Archived" }
        );
        assert_eq!(
            state_filter(false),
            doc! { "$or": [{"state": "Draft"}, {"state": "Published"}] }
        );
    }
}
