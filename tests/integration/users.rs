use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use exercise_tracker::store::FileStore;

use super::{app, app_with_store, create_user, get, post_form, post_json};

#[tokio::test]
async fn missing_username_is_rejected_and_nothing_persisted() {
    let app = app();

    let (status, body) = post_form(&app, "/api/exercise/new-user", "username=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "username is not present");

    let (status, body) = post_json(&app, "/api/exercise/new-user", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "username is not present");

    let (_, users) = get(&app, "/api/exercise/users").await;
    assert_eq!(users, "[]");
}

#[tokio::test]
async fn duplicate_username_keeps_only_the_first() {
    let app = app();
    let first = create_user(&app, "alice").await;

    let (status, body) = post_form(&app, "/api/exercise/new-user", "username=alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("duplicate key"), "{body}");

    let (_, users) = get(&app, "/api/exercise/users").await;
    let users: Vec<Value> = serde_json::from_str(&users).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["_id"], first["_id"]);
}

#[tokio::test]
async fn json_body_is_accepted() {
    let app = app();
    let (status, body) = post_json(&app, "/api/exercise/new-user", json!({ "username": "bob" })).await;

    assert_eq!(status, StatusCode::OK);
    let user: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(user["username"], "bob");
}

#[tokio::test]
async fn listing_never_includes_exercises() {
    let app = app();
    let alice = create_user(&app, "alice").await;
    create_user(&app, "bob").await;
    super::add_exercise(&app, "alice", "run", 30, "2020-01-01").await;

    let (status, body) = get(&app, "/api/exercise/users").await;
    assert_eq!(status, StatusCode::OK);

    let users: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(
        users[0],
        json!({ "_id": alice["_id"], "username": "alice" })
    );
    assert!(users.iter().all(|u| u.get("exercises").is_none()));
}

#[tokio::test]
async fn listing_is_idempotent() {
    let app = app();
    for name in ["alice", "bob", "carol"] {
        create_user(&app, name).await;
    }

    let (_, first) = get(&app, "/api/exercise/users").await;
    let (_, second) = get(&app, "/api/exercise/users").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn all_views_agree_on_identity() {
    let app = app();
    let created = create_user(&app, "alice").await;
    let id = created["_id"].as_str().unwrap();

    let (_, users) = get(&app, "/api/exercise/users").await;
    let users: Vec<Value> = serde_json::from_str(&users).unwrap();

    let (status, log) = get(&app, &format!("/api/exercise/log/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let log: Value = serde_json::from_str(&log).unwrap();

    assert_eq!(users[0]["_id"], created["_id"]);
    assert_eq!(users[0]["username"], created["username"]);
    assert_eq!(log["_id"], created["_id"]);
    assert_eq!(log["username"], created["username"]);
    assert_eq!(log["count"], 0);
}

#[tokio::test]
async fn file_store_keeps_users_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.json");

    {
        let store = Arc::new(FileStore::open(&path).await.unwrap());
        let app = app_with_store(store, dir.path());
        create_user(&app, "alice").await;
        super::add_exercise(&app, "alice", "swim", 45, "2021-05-05").await;
    }

    let store = Arc::new(FileStore::open(&path).await.unwrap());
    let app = app_with_store(store, dir.path());

    let (status, body) = get(&app, "/api/exercise/log/alice").await;
    assert_eq!(status, StatusCode::OK);
    let log: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(log["count"], 1);
    assert_eq!(log["log"][0]["description"], "swim");
}
