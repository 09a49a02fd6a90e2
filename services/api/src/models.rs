//! API Models
//!
//! This module defines the request and response bodies of the REST API and the
//! in-memory session record they are rendered from. All response types carry
//! `utoipa` schemas for the OpenAPI document.

use chrono::{DateTime, Utc};
use leetmigo_core::{
    HistoryStep, Navigator, NavigatorState, NodeKind, coach::GeneratedProblem,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A learner's navigation session, kept in memory only.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: String,
    pub trail: NavigatorState,
    pub problem: Option<GeneratedProblem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudySession {
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            trail: NavigatorState::default(),
            problem: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Category,
    Leaf,
    Hybrid,
}

impl From<NodeKind> for StopKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Category => StopKind::Category,
            NodeKind::Leaf => StopKind::Leaf,
            NodeKind::Hybrid => StopKind::Hybrid,
        }
    }
}

/// One step of a session's path.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    #[schema(example = "Perform Reversal")]
    pub label: String,
    pub content: String,
    pub code: Option<String>,
}

impl From<HistoryStep<'_>> for HistoryEntry {
    fn from(step: HistoryStep<'_>) -> Self {
        Self {
            label: step.label.to_string(),
            content: step.content.to_string(),
            code: step.code.map(str::to_string),
        }
    }
}

/// The node the session currently stands on.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CurrentStop {
    #[schema(example = "hybrid")]
    pub kind: StopKind,
    pub content: Option<String>,
    pub code: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Problem {
    #[schema(example = "Arrays")]
    pub subject: String,
    pub markdown: String,
}

impl From<&GeneratedProblem> for Problem {
    fn from(problem: &GeneratedProblem) -> Self {
        Self {
            subject: problem.subject.to_string(),
            markdown: problem.markdown.clone(),
        }
    }
}

/// Full view of a session as returned by every session endpoint.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub path: Vec<String>,
    /// Labels that can be sent to `descend` next.
    pub choices: Vec<String>,
    pub current: CurrentStop,
    /// Most recent step first.
    pub history: Vec<HistoryEntry>,
    pub problem: Option<Problem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    pub fn render(session: &StudySession, navigator: &Navigator<'_>) -> Self {
        let snapshot = navigator.snapshot();
        Self {
            id: session.id,
            path: snapshot.path.to_vec(),
            choices: snapshot.choices.iter().map(|c| c.to_string()).collect(),
            current: CurrentStop {
                kind: snapshot.kind.into(),
                content: snapshot.content.map(str::to_string),
                code: snapshot.code.map(str::to_string),
            },
            history: snapshot.history.into_iter().map(HistoryEntry::from).collect(),
            problem: session.problem.as_ref().map(Problem::from),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

/// Short listing entry for `GET /sessions`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionSummary {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub depth: usize,
    pub path: Vec<String>,
    pub has_problem: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&StudySession> for SessionSummary {
    fn from(session: &StudySession) -> Self {
        Self {
            id: session.id,
            depth: session.trail.depth(),
            path: session.trail.path().to_vec(),
            has_problem: session.problem.is_some(),
            updated_at: session.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SubjectSummary {
    #[schema(example = "Edge Lists")]
    pub name: String,
    pub choices: Vec<String>,
    pub topics: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct DescendPayload {
    #[schema(example = "Arrays")]
    pub label: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct BacktrackPayload {
    #[schema(example = 1)]
    pub depth: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct FeedbackPayload {
    #[schema(example = "I would use two pointers and swap from both ends.")]
    pub feedback: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use leetmigo_core::{Subject, assemble};

    #[test]
    fn test_stop_kind_serialization() {
        assert_eq!(serde_json::to_string(&StopKind::Hybrid).unwrap(), "\"hybrid\"");
        let parsed: StopKind = serde_json::from_str("\"category\"").unwrap();
        assert_eq!(parsed, StopKind::Category);
        assert!(serde_json::from_str::<StopKind>("\"Root\"").is_err());
    }

    #[test]
    fn test_session_view_renders_navigator() {
        let map = assemble().unwrap();
        let mut navigator = Navigator::new(&map);
        navigator.descend("Arrays").unwrap();
        navigator.descend("Perform Reversal").unwrap();

        let mut session = StudySession::new("user-1".to_string());
        session.problem = Some(GeneratedProblem {
            subject: Subject::Arrays,
            markdown: "#### Reverse".to_string(),
        });

        let view = SessionView::render(&session, &navigator);
        assert_eq!(view.id, session.id);
        assert_eq!(view.path, vec!["Arrays", "Perform Reversal"]);
        assert_eq!(view.choices, vec!["Two Pointers"]);
        assert_eq!(view.current.kind, StopKind::Hybrid);
        assert_eq!(view.history[0].label, "Perform Reversal");
        assert_eq!(view.history[1].label, "Arrays");
        assert_eq!(view.problem.unwrap().subject, "Arrays");
    }

    #[test]
    fn test_session_summary_from_session() {
        let mut session = StudySession::new("user-2".to_string());
        let map = assemble().unwrap();
        let mut navigator = Navigator::new(&map);
        navigator.descend("Trees").unwrap();
        session.trail = navigator.into_state();

        let summary = SessionSummary::from(&session);
        assert_eq!(summary.depth, 1);
        assert_eq!(summary.path, vec!["Trees"]);
        assert!(!summary.has_problem);
    }

    #[test]
    fn test_descend_payload_requires_label() {
        let payload: DescendPayload = serde_json::from_str(r#"{"label": "Arrays"}"#).unwrap();
        assert_eq!(payload.label, "Arrays");
        assert!(serde_json::from_str::<DescendPayload>("{}").is_err());
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Session not found".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"Session not found"}"#);
    }
}
