use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::{add_exercise, app, create_user, get, post_form, post_json};

fn dates(log: &Value) -> Vec<String> {
    log["log"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap()[..10].to_string())
        .collect()
}

async fn seeded() -> (axum::Router, Value) {
    let app = app();
    let user = create_user(&app, "alice").await;
    add_exercise(&app, "alice", "jan", 10, "2020-01-01").await;
    add_exercise(&app, "alice", "jun", 20, "2020-06-01").await;
    add_exercise(&app, "alice", "dec", 30, "2020-12-01").await;
    (app, user)
}

async fn log(app: &axum::Router, uri: &str) -> Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn add_returns_full_updated_user() {
    let app = app();
    let user = create_user(&app, "alice").await;
    add_exercise(&app, "alice", "run", 30, "2020-01-01").await;

    let updated = add_exercise(&app, user["_id"].as_str().unwrap(), "row", 15, "2020-01-02").await;

    assert_eq!(updated["_id"], user["_id"]);
    let exercises = updated["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(exercises[0]["description"], "run");
    assert_eq!(exercises[1]["description"], "row");
    assert_eq!(exercises[1]["duration"], 15);
    assert_eq!(exercises[1]["date"], "2020-01-02T00:00:00.000Z");
}

#[tokio::test]
async fn add_with_unknown_user_is_rejected() {
    let app = app();
    create_user(&app, "alice").await;

    for reference in ["bob", "5f1d7a0c9e7f1a2b3c4d5e6f", ""] {
        let (status, body) = post_form(
            &app,
            "/api/exercise/add",
            &format!("userId={reference}&description=run&duration=10"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "username invalid");
    }
}

#[tokio::test]
async fn add_without_date_stamps_now() {
    let app = app();
    create_user(&app, "alice").await;

    let before = Utc::now();
    let (status, body) = post_json(
        &app,
        "/api/exercise/add",
        json!({ "userId": "alice", "description": "run", "duration": 25 }),
    )
    .await;
    let after = Utc::now();

    assert_eq!(status, StatusCode::OK);
    let user: Value = serde_json::from_str(&body).unwrap();
    let date: DateTime<Utc> = user["exercises"][0]["date"].as_str().unwrap().parse().unwrap();

    // Serialized with millisecond precision.
    assert!(date >= before - chrono::Duration::milliseconds(1));
    assert!(date <= after);
}

#[tokio::test]
async fn add_reports_first_schema_error_only() {
    let app = app();
    create_user(&app, "alice").await;

    let (status, body) = post_form(&app, "/api/exercise/add", "userId=alice&duration=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Path `description` is required.");

    let (status, body) = post_form(
        &app,
        "/api/exercise/add",
        "userId=alice&description=run&duration=10&date=someday",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Cast to Date failed for value \"someday\" at path \"date\"");

    let (_, log) = get(&app, "/api/exercise/log/alice").await;
    let log: Value = serde_json::from_str(&log).unwrap();
    assert_eq!(log["count"], 0);
}

#[tokio::test]
async fn from_bound_keeps_later_exercises() {
    let (app, _) = seeded().await;
    let log = log(&app, "/api/exercise/log/alice?from=2020-03-01").await;

    assert_eq!(dates(&log), vec!["2020-06-01", "2020-12-01"]);
}

#[tokio::test]
async fn from_and_to_bounds_compose() {
    let (app, _) = seeded().await;
    let log = log(&app, "/api/exercise/log/alice?from=2020-03-01&to=2020-09-01").await;

    assert_eq!(dates(&log), vec!["2020-06-01"]);
    assert_eq!(log["count"], 1);
}

#[tokio::test]
async fn limit_takes_first_in_stored_order() {
    let (app, user) = seeded().await;
    let id = user["_id"].as_str().unwrap();
    let log = log(&app, &format!("/api/exercise/log/{id}?limit=1")).await;

    assert_eq!(dates(&log), vec!["2020-01-01"]);
    assert_eq!(log["log"][0]["description"], "jan");
}

#[tokio::test]
async fn log_has_count_and_no_exercises_field() {
    let (app, user) = seeded().await;

    for uri in [
        "/api/exercise/log/alice",
        "/api/exercise/log/alice?from=2020-03-01",
        "/api/exercise/log/alice?to=2020-01-01",
        "/api/exercise/log/alice?limit=2",
        "/api/exercise/log/alice?from=2021-01-01",
    ] {
        let log = log(&app, uri).await;
        assert_eq!(log["count"].as_u64().unwrap() as usize, log["log"].as_array().unwrap().len());
        assert!(log.get("exercises").is_none());
        assert_eq!(log["_id"], user["_id"]);
    }
}

#[tokio::test]
async fn unparseable_date_bound_yields_empty_log() {
    let (app, _) = seeded().await;

    for uri in ["/api/exercise/log/alice?from=soon", "/api/exercise/log/alice?to=later"] {
        let log = log(&app, uri).await;
        assert_eq!(log["count"], 0);
        assert_eq!(log["log"], json!([]));
    }
}

#[tokio::test]
async fn limit_follows_slice_semantics() {
    let (app, _) = seeded().await;

    let negative = log(&app, "/api/exercise/log/alice?limit=-1").await;
    assert_eq!(dates(&negative), vec!["2020-01-01", "2020-06-01"]);
    assert_eq!(negative["count"], 2);

    let fractional = log(&app, "/api/exercise/log/alice?limit=1.5").await;
    assert_eq!(dates(&fractional), vec!["2020-01-01"]);

    let words = log(&app, "/api/exercise/log/alice?limit=many").await;
    assert_eq!(words["count"], 0);
}

#[tokio::test]
async fn unknown_user_log_is_rejected() {
    let app = app();
    let (status, body) = get(&app, "/api/exercise/log/nobody").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "username invalid");
}
