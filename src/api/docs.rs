//! OpenAPI document for the exercise API.

use utoipa::OpenApi;

use super::handlers::{self, AddExerciseRequest, NewUserRequest};
use crate::exercise::{Exercise, User, UserLog, UserSummary};

/// OpenAPI description of the four exercise endpoints.
#[derive(OpenApi)]
#[openapi(
    info(title = "Exercise Tracker", description = "Users, logged exercises and filtered logs"),
    paths(
        handlers::new_user,
        handlers::list_users,
        handlers::add_exercise,
        handlers::exercise_log
    ),
    components(schemas(User, UserSummary, UserLog, Exercise, NewUserRequest, AddExerciseRequest)),
    tags((name = "exercise", description = "Exercise tracking"))
)]
pub struct ApiDoc;

/// Render the OpenAPI document as pretty JSON.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}
