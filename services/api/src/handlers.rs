//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for subjects and
//! study sessions. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use leetmigo_core::{DecisionMap, NavigationError, Navigator};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    models::{
        BacktrackPayload, DescendPayload, ErrorResponse, FeedbackPayload, FeedbackResponse,
        SessionSummary, SessionView, StudySession, SubjectSummary,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// A label that is not one of the current choices.
    InvalidTransition(NavigationError),
    /// The content service failed or returned nothing usable.
    Upstream(anyhow::Error),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InvalidTransition(err) => {
                let message = err.to_string();
                (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Upstream(err) => {
                warn!("Content service failure: {:?}", err);
                let message = format!("Content service failed: {}", err);
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

fn user_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("x-user-id header is required".to_string()))
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session with id '{}' not found", id))
}

fn resume<'m>(map: &'m DecisionMap, session: &StudySession) -> Result<Navigator<'m>, ApiError> {
    Navigator::resume(map, session.trail.clone())
        .map_err(|e| ApiError::InternalServerError(e.into()))
}

fn render(map: &DecisionMap, session: &StudySession) -> Result<SessionView, ApiError> {
    let navigator = resume(map, session)?;
    Ok(SessionView::render(session, &navigator))
}

/// Runs one navigator operation against a stored session and renders the result.
async fn navigate<F>(
    state: &AppState,
    headers: &HeaderMap,
    id: Uuid,
    op: F,
) -> Result<Json<SessionView>, ApiError>
where
    F: FnOnce(&mut Navigator<'_>) -> Result<(), NavigationError>,
{
    let user_id = user_id(headers)?;
    let map = &state.map;
    let view = state
        .sessions
        .update(id, user_id, |session| {
            let mut navigator = resume(map, session)?;
            op(&mut navigator).map_err(ApiError::InvalidTransition)?;
            session.trail = navigator.into_state();
            render(map, session)
        })
        .await
        .ok_or_else(|| not_found(id))??;
    Ok(Json(view))
}

/// List the subjects at the root of the decision map.
#[utoipa::path(
    get,
    path = "/subjects",
    responses(
        (status = 200, description = "Subjects with their first-level choices", body = [SubjectSummary])
    )
)]
pub async fn list_subjects(State(state): State<Arc<AppState>>) -> Json<Vec<SubjectSummary>> {
    let root = state.map.root();
    let subjects = root
        .labels()
        .filter_map(|name| {
            root.child(name).map(|node| SubjectSummary {
                name: name.to_string(),
                choices: node.labels().map(str::to_string).collect(),
                topics: node.node_count(),
            })
        })
        .collect();
    Json(subjects)
}

/// Start a new study session at the root of the map.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = SessionView),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user creating the session")
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user_id(&headers)?;
    let session = state.sessions.create(user_id).await;
    info!(session_id = %session.id, user_id, "Session created");
    Ok((StatusCode::CREATED, Json(render(&state.map, &session)?)))
}

/// List all sessions for a user.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "List of sessions", body = [SessionSummary]),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let user_id = user_id(&headers)?;
    let sessions = state.sessions.list(user_id).await;
    Ok(Json(sessions.iter().map(SessionSummary::from).collect()))
}

/// Get a specific session by its ID.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let user_id = user_id(&headers)?;
    let session = state
        .sessions
        .get(id, user_id)
        .await
        .ok_or_else(|| not_found(id))?;
    Ok(Json(render(&state.map, &session)?))
}

/// Delete a session.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let user_id = user_id(&headers)?;
    if !state.sessions.remove(id, user_id).await {
        return Err(not_found(id));
    }
    info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Move into one of the current choices.
#[utoipa::path(
    post,
    path = "/sessions/{id}/descend",
    request_body = DescendPayload,
    responses(
        (status = 200, description = "Moved to the chosen topic", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 422, description = "Label is not one of the current choices", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn descend(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<DescendPayload>,
) -> Result<Json<SessionView>, ApiError> {
    navigate(&state, &headers, id, |navigator| {
        navigator.descend(&payload.label).map(|_| ())
    })
    .await
}

/// Undo the most recent choice. Does nothing at the root.
#[utoipa::path(
    post,
    path = "/sessions/{id}/undo",
    responses(
        (status = 200, description = "Stepped back one level", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn undo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    navigate(&state, &headers, id, |navigator| {
        navigator.undo();
        Ok(())
    })
    .await
}

/// Clear the path and return to the root.
#[utoipa::path(
    post,
    path = "/sessions/{id}/reset",
    responses(
        (status = 200, description = "Returned to the root", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    navigate(&state, &headers, id, |navigator| {
        navigator.reset();
        Ok(())
    })
    .await
}

/// Keep only the first `depth` choices of the path.
#[utoipa::path(
    post,
    path = "/sessions/{id}/backtrack",
    request_body = BacktrackPayload,
    responses(
        (status = 200, description = "Path truncated", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn backtrack(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<BacktrackPayload>,
) -> Result<Json<SessionView>, ApiError> {
    navigate(&state, &headers, id, |navigator| {
        navigator.backtrack(payload.depth);
        Ok(())
    })
    .await
}

/// Draw a random subject and generate a practice problem for the session.
#[utoipa::path(
    post,
    path = "/sessions/{id}/problem",
    responses(
        (status = 200, description = "Problem generated and stored on the session", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Content service failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn generate_problem(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let user_id = user_id(&headers)?;
    if state.sessions.get(id, user_id).await.is_none() {
        return Err(not_found(id));
    }

    let tree = {
        let mut sampler = state
            .sampler
            .lock()
            .map_err(|_| anyhow::anyhow!("Sampler lock poisoned"))?;
        sampler.sample()?
    };
    info!(session_id = %id, subject = %tree.subject, "Generating problem");

    let problem = state
        .coach
        .generate_problem(&tree)
        .await
        .map_err(ApiError::Upstream)?;

    let map = &state.map;
    let view = state
        .sessions
        .update(id, user_id, |session| {
            session.problem = Some(problem);
            render(map, session)
        })
        .await
        .ok_or_else(|| not_found(id))??;
    Ok(Json(view))
}

/// Review the learner's approach to the session's current problem.
#[utoipa::path(
    post,
    path = "/sessions/{id}/feedback",
    request_body = FeedbackPayload,
    responses(
        (status = 200, description = "Feedback on the learner's approach", body = FeedbackResponse),
        (status = 400, description = "No problem generated yet, or empty feedback", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 502, description = "Content service failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn request_feedback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeedbackPayload>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let user_id = user_id(&headers)?;
    let session = state
        .sessions
        .get(id, user_id)
        .await
        .ok_or_else(|| not_found(id))?;

    let problem = session.problem.as_ref().ok_or_else(|| {
        ApiError::BadRequest("Generate a problem before requesting feedback".to_string())
    })?;
    if payload.feedback.trim().is_empty() {
        return Err(ApiError::BadRequest("Feedback text is empty".to_string()));
    }

    let feedback = state
        .coach
        .request_feedback(problem, &session.trail, &payload.feedback)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(FeedbackResponse { feedback }))
}
