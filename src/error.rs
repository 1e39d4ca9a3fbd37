use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for anything that can go wrong serving a request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error.
    #[error(transparent)]
    Db(#[from] DbError),

    /// CSV serialisation error.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A requested resource does not exist.
    #[error("{0} not found.")]
    NotFound(String),

    /// Catch-all error with explicit status.
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// A not-found error for the named resource, e.g. `not_found("Election")`
    /// produces the message "Election not found.".
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    fn status(&self) -> Status {
        match self {
            Error::Db(_) | Error::Csv(_) => Status::InternalServerError,
            Error::NotFound(_) => Status::NotFound,
            Error::Status(status, _) => *status,
        }
    }
}

/// The JSON body sent with every error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    /// Internal error detail, only populated in debug builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class() == StatusClass::ServerError {
            error!("{self}");
        }

        // Internal errors get a generic message; the real cause is logged
        // server-side and only exposed to clients on the debug profile.
        let body = match &self {
            Error::Db(_) | Error::Csv(_) => ErrorResponse {
                success: false,
                message: "Internal server error.".to_string(),
                detail: (req.rocket().config().profile == rocket::Config::DEBUG_PROFILE)
                    .then(|| self.to_string()),
            },
            _ => ErrorResponse {
                success: false,
                message: self.to_string(),
                detail: None,
            },
        };

        (status, Json(body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::Value};

    use super::*;

    #[get("/missing")]
    fn missing() -> Result<()> {
        Err(Error::not_found("Election"))
    }

    #[rocket::async_test]
    async fn not_found_errors_render_as_json() {
        let client = Client::untracked(rocket::build().mount("/", routes![missing]))
            .await
            .unwrap();

        let response = client.get("/missing").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Election not found.");
    }

    #[get("/broken")]
    fn broken() -> Result<()> {
        Err(Error::Status(
            Status::InternalServerError,
            "It's all gone wrong".to_string(),
        ))
    }

    #[rocket::async_test]
    async fn statuses_pass_through() {
        let client = Client::untracked(rocket::build().mount("/", routes![broken]))
            .await
            .unwrap();

        let response = client.get("/broken").dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "It's all gone wrong");
    }
}
