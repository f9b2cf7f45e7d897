//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::extract::Payload;
use crate::error::{plain_text, ApiError};
use crate::exercise::{ExerciseDraft, FieldValue, LogFilter, LogQuery, User, UserLog, UserSummary};
use crate::metrics;
use crate::store::{UserFilter, UserStore};

/// Message for a missing username on creation.
pub const USERNAME_MISSING: &str = "username is not present";
/// Message for a reference that matches no user.
pub const USERNAME_INVALID: &str = "username invalid";

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// User collection.
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    /// Create new app state over a store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    async fn find_by_reference(&self, reference: &str) -> Result<User, ApiError> {
        self.store
            .find_user(&UserFilter::username_or_id(reference))
            .await?
            .ok_or_else(|| ApiError::NotFound(USERNAME_INVALID.to_string()))
    }
}

/// New user request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NewUserRequest {
    /// Unique username.
    pub username: Option<String>,
}

/// Add exercise request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddExerciseRequest {
    /// Username or user identifier.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    /// What was done.
    pub description: Option<String>,
    /// How long it took.
    #[schema(value_type = Option<f64>)]
    pub duration: Option<FieldValue>,
    /// When it happened; defaults to now.
    pub date: Option<String>,
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/exercise/new-user",
    request_body(content = NewUserRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Created user", body = User),
        (status = 400, description = "Missing or duplicate username", body = String, content_type = "text/plain")
    ),
    tag = "exercise"
)]
#[instrument(skip_all)]
pub async fn new_user(
    State(state): State<AppState>,
    Payload(body): Payload<NewUserRequest>,
) -> Result<Json<User>, ApiError> {
    let _timer = metrics::timer_http("new_user");

    let username = body
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation(USERNAME_MISSING.to_string()))?;

    let user = state.store.create_user(&username).await?;
    metrics::inc_users_created();
    info!(id = %user.id, username = %user.username, "user created");

    Ok(Json(user))
}

/// List users without their exercises.
#[utoipa::path(
    get,
    path = "/api/exercise/users",
    responses(
        (status = 200, description = "All users", body = [UserSummary]),
        (status = 400, description = "Store failure", body = String, content_type = "text/plain")
    ),
    tag = "exercise"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let _timer = metrics::timer_http("list_users");

    Ok(Json(state.store.list_users().await?))
}

/// Append an exercise to a user's log.
#[utoipa::path(
    post,
    path = "/api/exercise/add",
    request_body(content = AddExerciseRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Unknown user or invalid exercise", body = String, content_type = "text/plain")
    ),
    tag = "exercise"
)]
#[instrument(skip_all)]
pub async fn add_exercise(
    State(state): State<AppState>,
    Payload(body): Payload<AddExerciseRequest>,
) -> Result<Json<User>, ApiError> {
    let _timer = metrics::timer_http("add_exercise");
    let now = Utc::now();

    let reference = body.user_id.unwrap_or_default();
    debug!(reference = %reference, "looking up user");
    let mut user = state.find_by_reference(&reference).await?;

    let exercise = ExerciseDraft {
        description: body.description,
        duration: body.duration,
        date: body.date,
    }
    .validate(now)?;

    user.append_exercise(exercise);
    state.store.save_user(&user).await?;
    metrics::inc_exercises_added();
    info!(id = %user.id, exercises = user.exercises.len(), "exercise added");

    Ok(Json(user))
}

/// Fetch a user's exercise log, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/exercise/log/{userid}",
    params(
        ("userid" = String, Path, description = "Username or user identifier"),
        LogQuery
    ),
    responses(
        (status = 200, description = "User with filtered log", body = UserLog),
        (status = 400, description = "Unknown user", body = String, content_type = "text/plain")
    ),
    tag = "exercise"
)]
#[instrument(skip_all)]
pub async fn exercise_log(
    State(state): State<AppState>,
    Path(userid): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<UserLog>, ApiError> {
    let _timer = metrics::timer_http("exercise_log");
    debug!(reference = %userid, "fetching log");

    let user = state.find_by_reference(&userid).await?;
    let filter = LogFilter::from(query);

    let log = filter.apply(&user.exercises);
    metrics::inc_log_requests();

    Ok(Json(UserLog::new(user, log)))
}

/// Catch-all for unmatched routes.
pub async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "not found".to_string())
}

/// Terminal handler for panics inside request handling.
pub fn internal_error(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    ApiError::Internal.into_response()
}
