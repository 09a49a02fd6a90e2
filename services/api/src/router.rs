//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        BacktrackPayload, CurrentStop, DescendPayload, ErrorResponse, FeedbackPayload,
        FeedbackResponse, HistoryEntry, Problem, SessionSummary, SessionView, StopKind,
        SubjectSummary,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_subjects,
        handlers::create_session,
        handlers::list_sessions,
        handlers::get_session,
        handlers::delete_session,
        handlers::descend,
        handlers::undo,
        handlers::reset,
        handlers::backtrack,
        handlers::generate_problem,
        handlers::request_feedback,
    ),
    components(
        schemas(
            SessionView, SessionSummary, CurrentStop, StopKind, HistoryEntry, Problem,
            SubjectSummary, DescendPayload, BacktrackPayload, FeedbackPayload,
            FeedbackResponse, ErrorResponse
        )
    ),
    tags(
        (name = "Leetmigo API", description = "Decision-map navigation and practice problems")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/subjects", get(handlers::list_subjects))
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/descend", post(handlers::descend))
        .route("/sessions/{id}/undo", post(handlers::undo))
        .route("/sessions/{id}/reset", post(handlers::reset))
        .route("/sessions/{id}/backtrack", post(handlers::backtrack))
        .route("/sessions/{id}/problem", post(handlers::generate_problem))
        .route("/sessions/{id}/feedback", post(handlers::request_feedback))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
