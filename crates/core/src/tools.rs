//! Navigator MCP Service
//!
//! Exposes a single navigation session as Model Context Protocol tools, so an
//! external agent (like an LLM) can walk the decision map the same way a
//! learner does: list the choices, descend, undo, reset and read the history.

use crate::{
    assembler::DecisionMap,
    error::NavigationError,
    navigator::{Navigator, NavigatorState},
    sampler::Sampler,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

// --- Data Structures for Tools ---

/// Arguments for the `descend` tool.
#[derive(Deserialize, JsonSchema, Debug)]
pub struct DescendArgs {
    /// One of the labels returned by `list_choices`.
    #[schemars(description = "The label of the child topic to move into, exactly as listed")]
    pub label: String,
}

/// Arguments for the `backtrack` tool.
#[derive(Deserialize, JsonSchema, Debug)]
pub struct BacktrackArgs {
    #[schemars(description = "How many steps of the path to keep (0 returns to the root)")]
    pub depth: usize,
}

// --- Service and Handler Implementation ---

/// MCP tools over one navigation session.
pub struct NavigatorService {
    map: Arc<DecisionMap>,
    /// The session's navigation state, shared with whoever owns the session.
    pub trail: Arc<Mutex<NavigatorState>>,
    /// Optional channel for broadcasting state changes to subscribers.
    pub state_tx: Option<mpsc::Sender<NavigatorState>>,
    sampler: Mutex<Sampler>,
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for NavigatorService {
    /// Returns server information and capabilities, advertising tool support.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Walk an algorithm study map: call list_choices, then descend into one of the \
                 listed labels. Use undo, backtrack or reset to change course."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[tool_router]
impl NavigatorService {
    pub fn new(
        map: Arc<DecisionMap>,
        trail: Arc<Mutex<NavigatorState>>,
        state_tx: Option<mpsc::Sender<NavigatorState>>,
        sampler: Sampler,
    ) -> Self {
        Self {
            map,
            trail,
            state_tx,
            sampler: Mutex::new(sampler),
            tool_router: Self::tool_router(),
        }
    }

    /// Lists the labels available from the current stop together with its content.
    #[tool(
        description = "Show the current position in the study map: path, available choices, and the current topic's explanation and code."
    )]
    pub async fn list_choices(&self) -> Result<String, String> {
        info!("Executing tool 'list_choices'");
        let trail = self.trail.lock().await;
        let navigator = self.resume(trail.clone())?;
        to_json(&navigator.snapshot())
    }

    /// Moves into one of the current choices.
    #[tool(description = "Move into one of the available child topics by its exact label.")]
    pub async fn descend(&self, args: Parameters<DescendArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'descend'");
        self.mutate(|navigator| navigator.descend(&args.0.label).map(|_| ()))
            .await
    }

    /// Steps back one level; does nothing at the root.
    #[tool(description = "Undo the most recent choice. Does nothing at the root.")]
    pub async fn undo(&self) -> Result<String, String> {
        info!("Executing tool 'undo'");
        self.mutate(|navigator| {
            navigator.undo();
            Ok(())
        })
        .await
    }

    /// Truncates the path to the requested depth.
    #[tool(description = "Jump back to an earlier step, keeping only the first `depth` choices.")]
    pub async fn backtrack(&self, args: Parameters<BacktrackArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'backtrack'");
        self.mutate(|navigator| {
            navigator.backtrack(args.0.depth);
            Ok(())
        })
        .await
    }

    /// Returns to the root of the map.
    #[tool(description = "Clear the path and return to the root of the study map.")]
    pub async fn reset(&self) -> Result<String, String> {
        info!("Executing tool 'reset'");
        self.mutate(|navigator| {
            navigator.reset();
            Ok(())
        })
        .await
    }

    /// Returns every step taken so far, oldest first.
    #[tool(description = "Get the full history of choices, with the explanation and code recorded at each step.")]
    pub async fn get_history(&self) -> Result<String, String> {
        info!("Executing tool 'get_history'");
        let trail = self.trail.lock().await;
        to_json(&trail.history())
    }

    /// Draws a random subject with its code stripped, for problem generation.
    #[tool(
        description = "Draw a random subject tree with all code removed, suitable for writing a practice problem."
    )]
    pub async fn sample_subject(&self) -> Result<String, String> {
        info!("Executing tool 'sample_subject'");
        let pruned = self
            .sampler
            .lock()
            .await
            .sample()
            .map_err(|e| e.to_string())?;
        to_json(&pruned)
    }
}

impl NavigatorService {
    fn resume(&self, state: NavigatorState) -> Result<Navigator<'_>, String> {
        Navigator::resume(&self.map, state).map_err(|e| e.to_string())
    }

    /// Applies `op` to the session and stores the result. A rejected
    /// operation leaves the stored state as it was.
    async fn mutate<F>(&self, op: F) -> Result<String, String>
    where
        F: FnOnce(&mut Navigator<'_>) -> Result<(), NavigationError>,
    {
        let mut trail = self.trail.lock().await;
        let mut navigator = self.resume(trail.clone())?;
        op(&mut navigator).map_err(|e| e.to_string())?;

        let view = to_json(&navigator.snapshot())?;
        *trail = navigator.into_state();

        if let Some(tx) = &self.state_tx {
            if tx.send(trail.clone()).await.is_err() {
                warn!("Failed to broadcast state update: receiver dropped.");
            }
        }
        Ok(view)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Failed to serialize response: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use serde_json::Value;

    fn service() -> (NavigatorService, Arc<Mutex<NavigatorState>>) {
        let map = Arc::new(assemble().unwrap());
        let trail = Arc::new(Mutex::new(NavigatorState::default()));
        let service = NavigatorService::new(map, trail.clone(), None, Sampler::seeded(9));
        (service, trail)
    }

    fn descend_args(label: &str) -> Parameters<DescendArgs> {
        Parameters(DescendArgs {
            label: label.to_string(),
        })
    }

    #[tokio::test]
    async fn test_list_choices_at_root() {
        let (service, _) = service();
        let view: Value = serde_json::from_str(&service.list_choices().await.unwrap()).unwrap();
        assert_eq!(view["choices"].as_array().unwrap().len(), 6);
        assert_eq!(view["kind"], "category");
        assert!(view["path"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_descend_updates_shared_trail() {
        let (service, trail) = service();
        let view: Value =
            serde_json::from_str(&service.descend(descend_args("Trees")).await.unwrap()).unwrap();

        assert_eq!(view["path"], serde_json::json!(["Trees"]));
        assert!(view["content"].as_str().is_some());
        assert_eq!(trail.lock().await.path(), ["Trees"]);
    }

    #[tokio::test]
    async fn test_invalid_descend_is_an_error_and_keeps_state() {
        let (service, trail) = service();
        service.descend(descend_args("Arrays")).await.unwrap();
        let before = trail.lock().await.clone();

        let err = service
            .descend(descend_args("NotARealTopic"))
            .await
            .unwrap_err();
        assert!(err.contains("invalid transition"));
        assert_eq!(*trail.lock().await, before);
    }

    #[tokio::test]
    async fn test_undo_backtrack_and_reset() {
        let (service, trail) = service();
        for label in ["Arrays", "Perform Reversal", "Two Pointers"] {
            service.descend(descend_args(label)).await.unwrap();
        }

        service.undo().await.unwrap();
        assert_eq!(trail.lock().await.depth(), 2);

        service
            .backtrack(Parameters(BacktrackArgs { depth: 1 }))
            .await
            .unwrap();
        assert_eq!(trail.lock().await.path(), ["Arrays"]);

        service.reset().await.unwrap();
        assert_eq!(*trail.lock().await, NavigatorState::default());

        // Undo at the root still succeeds and changes nothing.
        service.undo().await.unwrap();
        assert_eq!(*trail.lock().await, NavigatorState::default());
    }

    #[tokio::test]
    async fn test_history_lists_steps_oldest_first() {
        let (service, _) = service();
        service.descend(descend_args("Strings")).await.unwrap();
        service
            .descend(descend_args("Cycle Detection"))
            .await
            .unwrap();

        let history: Value = serde_json::from_str(&service.get_history().await.unwrap()).unwrap();
        let labels: Vec<_> = history
            .as_array()
            .unwrap()
            .iter()
            .map(|step| step["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, ["Strings", "Cycle Detection"]);
    }

    #[tokio::test]
    async fn test_state_changes_are_broadcast() {
        let map = Arc::new(assemble().unwrap());
        let trail = Arc::new(Mutex::new(NavigatorState::default()));
        let (tx, mut rx) = mpsc::channel(4);
        let service = NavigatorService::new(map, trail, Some(tx), Sampler::seeded(1));

        service.descend(descend_args("Matrices")).await.unwrap();
        let broadcast = rx.recv().await.unwrap();
        assert_eq!(broadcast.path(), ["Matrices"]);
    }

    #[tokio::test]
    async fn test_sample_subject_has_no_code() {
        let (service, _) = service();
        let sampled = service.sample_subject().await.unwrap();
        let value: Value = serde_json::from_str(&sampled).unwrap();
        assert!(value["subject"].as_str().is_some());
        assert!(!sampled.contains("\"code\""));
    }
}
