//! HTTP API route definitions.

use std::path::PathBuf;

use axum::{
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::handlers::{
    add_exercise, exercise_log, internal_error, list_users, new_user, not_found, AppState,
};
use crate::config::Config;

/// Locations of the static landing page and assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAssets {
    /// Directory served for unmatched GET paths.
    pub public_dir: PathBuf,
    /// File served at `/`.
    pub index_page: PathBuf,
}

impl StaticAssets {
    /// Assets rooted at the configured directories.
    pub fn from_config(config: &Config) -> Self {
        Self {
            public_dir: config.public_dir.clone(),
            index_page: config.index_page(),
        }
    }
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Exercise API routes. Wrong methods on known paths fall through to 404.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/exercise/new-user", post(new_user).fallback(not_found))
        .route("/api/exercise/users", get(list_users).fallback(not_found))
        .route("/api/exercise/add", post(add_exercise).fallback(not_found))
        .route("/api/exercise/log/:userid", get(exercise_log).fallback(not_found))
}

/// Create the full application router: API, static files, 404 and error layers.
pub fn create_router(state: AppState, assets: &StaticAssets) -> Router {
    let public = ServeDir::new(&assets.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    api_router()
        .route_service("/", ServeFile::new(&assets.index_page))
        .fallback_service(public)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(internal_error))
}
