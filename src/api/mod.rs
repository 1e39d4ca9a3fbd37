use rocket::{
    serde::json::{json, Value},
    Catcher, Request, Route,
};

mod elections;
mod results;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(elections::routes());
    routes.extend(results::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, catch_all]
}

/// Requests that never reached a route still get the standard error shape.
#[catch(404)]
fn not_found() -> Value {
    json!({
        "success": false,
        "message": "Resource not found.",
    })
}

#[catch(default)]
fn catch_all(status: rocket::http::Status, _req: &Request) -> Value {
    json!({
        "success": false,
        "message": format!("{}.", status.reason_lossy()),
    })
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    use super::*;

    #[rocket::async_test]
    async fn unrouted_requests_get_json_errors() {
        let client = Client::untracked(rocket::build().register("/", catchers()))
            .await
            .unwrap();

        let response = client.get("/no/such/route").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::JSON));

        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Resource not found.");
    }
}
