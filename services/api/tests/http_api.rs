use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::Level;
use trip_planner_core::{InMemoryStore, PlannerService};

//=========================================================================================
// Helpers
//=========================================================================================

fn app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        db_max_connections: 1,
        log_level: Level::INFO,
        write_retry_limit: 3,
        cors_allow_origin: None,
    };
    router(Arc::new(AppState {
        planner: Arc::new(PlannerService::new(store.clone(), store)),
        config: Arc::new(config),
    }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn create_plan(app: &Router, input_time: u32) -> String {
    let (status, plan) = send(
        app,
        Method::POST,
        "/api/plans",
        Some(json!({
            "namePlan": "Portugal",
            "description": "Two weeks on the coast",
            "coverPicture": 4,
            "inputTime": input_time,
            "voteTime": 2,
            "users": ["alice"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{plan}");
    plan["id"].as_str().unwrap().to_string()
}

//=========================================================================================
// Plans
//=========================================================================================

#[tokio::test]
async fn created_plan_has_initial_status() {
    let app = app();
    let id = create_plan(&app, 3).await;

    let (status, plan) = send(&app, Method::GET, &format!("/api/plans/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["statusInputVote"], "3 days to");
    assert_eq!(plan["statusStage"], "Input Dates & Location");
    assert_eq!(plan["statusPlan"], "In Progress");
    assert_eq!(plan["datesAvailable"], json!([]));
}

#[tokio::test]
async fn unknown_plan_reads_as_failed() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/plans/6f1c9a7e-0000-4000-8000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "failed");

    let (status, body) = send(&app, Method::GET, "/api/plans/not-a-plan-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("failed"));
}

#[tokio::test]
async fn failed_plan_read_is_a_json_string() {
    let app = app();
    let request = Request::builder()
        .uri("/api/plans/not-a-plan-id")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"\"failed\"");
}

#[tokio::test]
async fn version_counter_is_not_a_plan_field() {
    let app = app();
    let id = create_plan(&app, 3).await;

    let (status, values) = send(&app, Method::GET, &format!("/api/plans/{id}/version"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(values, json!([]));
}

#[tokio::test]
async fn legacy_identity_field_names_are_accepted() {
    let app = app();
    let id = create_plan(&app, 2).await;

    let (status, plan) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/addUser"),
        Some(json!({ "auth0": "auth|dana" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["users"], json!(["alice", "auth|dana"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/submitted/locations"),
        Some(json!({ "auth0Id": "auth|dana" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, voted) = send(
        &app,
        Method::GET,
        &format!("/api/plans/{id}/submissions/locations/auth%7Cdana"),
        None,
    )
    .await;
    assert_eq!(voted, json!(true));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/updateDates"),
        Some(json!({ "dates": [], "lengthTrip": [4], "auth0Id": ["auth|dana"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, dates) = send(
        &app,
        Method::GET,
        &format!("/api/plans/{id}/submittedDates/auth%7Cdana"),
        None,
    )
    .await;
    assert_eq!(dates, json!({ "submitted": true }));

    let (status, user) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Dana", "email": "dana@example.org", "auth0Id": "auth|dana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["authId"], "auth|dana");
}

#[tokio::test]
async fn appended_location_is_listed() {
    let app = app();
    let id = create_plan(&app, 3).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/updateLocations"),
        Some(json!({ "placeName": "Lisbon", "motivation": "beach", "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, locations) = send(&app, Method::GET, &format!("/api/plans/{id}/locations"), None).await;
    let locations = locations.as_array().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["name"], "Lisbon");
    assert_eq!(locations[0]["motivation"], "beach");
    assert_eq!(locations[0]["username"], "alice");
}

#[tokio::test]
async fn votes_accumulate_and_oversized_batches_fail() {
    let app = app();
    let id = create_plan(&app, 3).await;

    send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/datesVotesOptions"),
        Some(json!([{ "date": "2024/9/1" }, { "date": "2024/9/8" }])),
    )
    .await;

    let votes = format!("/api/plans/{id}/submitVotes/dates");
    send(&app, Method::PUT, &votes, Some(json!([{ "points": 2 }, { "points": 3 }]))).await;
    let (status, plan) =
        send(&app, Method::PUT, &votes, Some(json!([{ "points": 1 }, { "points": 0 }]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["dates"][0]["points"], 3);
    assert_eq!(plan["dates"][1]["points"], 3);

    let (status, _) = send(
        &app,
        Method::PUT,
        &votes,
        Some(json!([{ "points": 1 }, { "points": 1 }, { "points": 1 }])),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, options) = send(
        &app,
        Method::GET,
        &format!("/api/plans/{id}/datesVotesOptions"),
        None,
    )
    .await;
    assert_eq!(options[0]["points"], 3);
    assert_eq!(options[1]["points"], 3);
}

#[tokio::test]
async fn submission_tracking_round_trip() {
    let app = app();
    let id = create_plan(&app, 2).await;
    let check = format!("/api/plans/{id}/submissions/residences/auth%7Cbob");

    let (_, before) = send(&app, Method::GET, &check, None).await;
    assert_eq!(before, json!(false));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/submitted/residences"),
        Some(json!({ "authId": "auth|bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = send(&app, Method::GET, &check, None).await;
    assert_eq!(after, json!(true));

    let (_, dates) = send(
        &app,
        Method::GET,
        &format!("/api/plans/{id}/submittedDates/auth%7Cbob"),
        None,
    )
    .await;
    assert_eq!(dates, json!({ "submitted": false }));
}

#[tokio::test]
async fn update_dates_marks_date_submitters() {
    let app = app();
    let id = create_plan(&app, 2).await;

    let (status, plan) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/updateDates"),
        Some(json!({
            "dates": [{ "date": "2024/10/1", "username": "carol" }],
            "lengthTrip": [5, 7],
            "userIds": ["carol"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["lengthStay"], json!([5, 7]));

    let (_, dates) = send(
        &app,
        Method::GET,
        &format!("/api/plans/{id}/submittedDates/carol"),
        None,
    )
    .await;
    assert_eq!(dates, json!({ "submitted": true }));
}

#[tokio::test]
async fn status_updates_are_partial_and_checked() {
    let app = app();
    let id = create_plan(&app, 3).await;
    let uri = format!("/api/plans/{id}");

    let (status, plan) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "statusStage": "Voting", "lastCheck": "2024/6/9" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["statusStage"], "Voting");
    assert_eq!(plan["lastCheck"], "2024/6/9");
    assert_eq!(plan["statusInputVote"], "3 days to");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "statusStage": "Input Dates & Location" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn replace_category_overwrites() {
    let app = app();
    let id = create_plan(&app, 3).await;
    for place in ["Lisbon", "Porto"] {
        send(
            &app,
            Method::PUT,
            &format!("/api/plans/{id}/updateLocations"),
            Some(json!({ "placeName": place, "motivation": "food", "username": "alice" })),
        )
        .await;
    }

    let (status, plan) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/replace/locations"),
        Some(json!([{ "name": "Faro", "motivation": "sun", "username": "bob", "points": 4 }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let locations = plan["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["name"], "Faro");
    assert_eq!(locations[0]["points"], 4);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/plans/{id}/replace/itinerary"),
        Some(json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//=========================================================================================
// Users
//=========================================================================================

#[tokio::test]
async fn user_plan_membership() {
    let app = app();
    let (status, user) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Alice", "email": "alice@example.org", "authId": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["plans"], json!([]));

    let id = create_plan(&app, 3).await;
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/users/alice/plans",
            Some(json!({ "planId": id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, plans) = send(&app, Method::GET, "/api/users/alice/plans", None).await;
    assert_eq!(plans, json!([id]));

    let (status, _) = send(&app, Method::GET, "/api/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, users) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}
