use chrono::Utc;
use mongodb::{bson::doc, options::SessionOptions, Client};
use rocket::{
    http::ContentType,
    response::{self, Responder, Response},
    serde::json::Json,
    Request, Route, State,
};

use crate::error::{Error, Result};
use crate::model::{
    api::results::{ElectionResults, PositionResult},
    common::election::{ElectionId, PositionId},
    db::{election::Election, vote::Vote},
    mongodb::{u32_id_filter, Coll},
};
use crate::tally;

pub fn routes() -> Vec<Route> {
    routes![election_results, position_results, election_results_csv]
}

/// The full results of an election, every position tallied.
#[get("/elections/<election_id>/results")]
async fn election_results(
    election_id: ElectionId,
    elections: Coll<Election>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<ElectionResults>> {
    let results = computed_results(election_id, &elections, &votes, db_client).await?;
    Ok(Json(results))
}

/// The results of a single position.
#[get("/elections/<election_id>/positions/<position_id>/results")]
async fn position_results(
    election_id: ElectionId,
    position_id: PositionId,
    elections: Coll<Election>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<Json<PositionResult>> {
    let position;
    let mut position_votes = Vec::new();
    {
        // Ensure we read a consistent snapshot of the election data.
        let session_options = SessionOptions::builder().snapshot(true).build();
        let mut session = db_client.start_session(Some(session_options)).await?;

        let election = elections
            .find_one_with_session(u32_id_filter(election_id), None, &mut session)
            .await?
            .ok_or_else(|| Error::not_found("Election"))?;
        position = election
            .position(position_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Position"))?;

        let votes_filter = doc! {
            "election_id": election_id,
            "position_id": position_id,
        };
        let mut cursor = votes
            .find_with_session(votes_filter, None, &mut session)
            .await?;
        while let Some(vote) = cursor.next(&mut session).await {
            position_votes.push(vote?);
        }
    }

    Ok(Json(tally::tally_position(&position, &position_votes)))
}

/// The full results of an election as a CSV file download.
#[get("/elections/<election_id>/results/export/csv")]
async fn election_results_csv(
    election_id: ElectionId,
    elections: Coll<Election>,
    votes: Coll<Vote>,
    db_client: &State<Client>,
) -> Result<CsvDownload> {
    let results = computed_results(election_id, &elections, &votes, db_client).await?;
    // The whole file is written out before we respond, so a tally or
    // serialisation failure can never produce a 200 with half a file.
    let bytes = tally::export_csv(&results)?;

    Ok(CsvDownload {
        filename: results_filename(election_id),
        bytes,
    })
}

/// Fetch an election and all its votes in one consistent snapshot, then
/// tally them.
async fn computed_results(
    election_id: ElectionId,
    elections: &Coll<Election>,
    votes: &Coll<Vote>,
    db_client: &Client,
) -> Result<ElectionResults> {
    let election;
    let mut election_votes = Vec::new();
    {
        // Votes are inserted while results are being read; a snapshot
        // session keeps the two reads consistent with each other.
        let session_options = SessionOptions::builder().snapshot(true).build();
        let mut session = db_client.start_session(Some(session_options)).await?;

        election = elections
            .find_one_with_session(u32_id_filter(election_id), None, &mut session)
            .await?
            .ok_or_else(|| Error::not_found("Election"))?;

        let votes_filter = doc! {
            "election_id": election_id,
        };
        let mut cursor = votes
            .find_with_session(votes_filter, None, &mut session)
            .await?;
        while let Some(vote) = cursor.next(&mut session).await {
            election_votes.push(vote?);
        }
    }

    Ok(tally::tally_election(&election, &election_votes))
}

fn results_filename(election_id: ElectionId) -> String {
    format!(
        "election-results-{}-{}.csv",
        election_id,
        Utc::now().format("%Y-%m-%d")
    )
}

/// A CSV file download: `text/csv` content delivered as an attachment.
pub struct CsvDownload {
    filename: String,
    bytes: Vec<u8>,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for CsvDownload {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        Response::build_from(self.bytes.respond_to(req)?)
            .header(ContentType::CSV)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;

    #[test]
    fn filenames_carry_the_election_and_the_date() {
        let filename = results_filename(7);
        let date = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(filename, format!("election-results-7-{date}.csv"));
    }

    #[get("/download")]
    fn download() -> CsvDownload {
        CsvDownload {
            filename: "election-results-7-2026-05-01.csv".to_string(),
            bytes: b"Election,Mock Election\n".to_vec(),
        }
    }

    #[rocket::async_test]
    async fn csv_downloads_set_the_attachment_headers() {
        let client = Client::untracked(rocket::build().mount("/", routes![download]))
            .await
            .unwrap();

        let response = client.get("/download").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::CSV));
        assert_eq!(
            response.headers().get_one("Content-Disposition"),
            Some(r#"attachment; filename="election-results-7-2026-05-01.csv""#)
        );
        assert_eq!(
            response.into_string().await.unwrap(),
            "Election,Mock Election\n"
        );
    }
}
