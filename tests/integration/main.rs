//! Integration tests for the exercise tracker HTTP API.
//!
//! These drive the full router (static files, 404 fallback and error layers
//! included) over an in-memory or file-backed store.

mod log;
mod users;

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use exercise_tracker::api::{create_router, AppState, StaticAssets};
use exercise_tracker::store::{MemoryStore, UserStore};

/// Router over a fresh in-memory store, with assets rooted at `root`.
pub fn app_with_assets(root: &Path) -> Router {
    app_with_store(Arc::new(MemoryStore::new("integration")), root)
}

/// Router over the given store.
pub fn app_with_store(store: Arc<dyn UserStore>, root: &Path) -> Router {
    let assets = StaticAssets {
        public_dir: root.join("public"),
        index_page: root.join("views").join("index.html"),
    };
    create_router(AppState::new(store), &assets)
}

/// Router over a fresh in-memory store without static assets.
pub fn app() -> Router {
    app_with_assets(Path::new("missing-assets"))
}

/// Send a request and collect status and body text.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// POST a URL-encoded form.
pub async fn post_form(app: &Router, uri: &str, body: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// POST a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

/// GET a path.
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

/// Create a user and return the parsed record.
pub async fn create_user(app: &Router, username: &str) -> Value {
    let (status, body) = post_form(app, "/api/exercise/new-user", &format!("username={username}")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

/// Add an exercise and return the updated user record.
pub async fn add_exercise(app: &Router, user: &str, description: &str, duration: u32, date: &str) -> Value {
    let (status, body) = post_form(
        app,
        "/api/exercise/add",
        &format!("userId={user}&description={description}&duration={duration}&date={date}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn landing_page_and_assets_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("views")).unwrap();
    std::fs::create_dir_all(dir.path().join("public")).unwrap();
    std::fs::write(dir.path().join("views/index.html"), "<h1>tracker</h1>").unwrap();
    std::fs::write(dir.path().join("public/style.css"), "body {}").unwrap();

    let app = app_with_assets(dir.path());

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>tracker</h1>");

    let (status, body) = get(&app, "/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");

    let (status, body) = get(&app, "/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "not found");
}
