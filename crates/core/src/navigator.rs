//! Decision-Tree Navigator
//!
//! Walks a [`DecisionMap`] one labeled edge at a time. The path of chosen
//! labels is the single source of truth; the current node is a cached view
//! into the map that can always be recomputed by replaying the path from the
//! root. Nodes carry no parent pointers, so stepping back is done by replay.

use crate::{
    assembler::DecisionMap,
    error::NavigationError,
    topic::{NodeKind, TopicNode},
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::{Deserialize, Serialize};
use std::ptr;
use tracing::{debug, warn};

/// The owned part of a navigation session: the chosen labels plus the
/// content and code snapshots taken at each step.
///
/// All three sequences always have the same length; deserializing a state
/// whose sequences disagree fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNavigatorState")]
pub struct NavigatorState {
    path: Vec<String>,
    content_stack: Vec<String>,
    code_stack: Vec<Option<String>>,
}

impl NavigatorState {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Content of the node reached after each step, `""` where a node has none.
    pub fn content_stack(&self) -> &[String] {
        &self.content_stack
    }

    pub fn code_stack(&self) -> &[Option<String>] {
        &self.code_stack
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// One entry per step, oldest first.
    pub fn history(&self) -> Vec<HistoryStep<'_>> {
        self.path
            .iter()
            .zip(&self.content_stack)
            .zip(&self.code_stack)
            .map(|((label, content), code)| HistoryStep {
                label,
                content,
                code: code.as_deref(),
            })
            .collect()
    }

    fn push(&mut self, label: &str, node: &TopicNode) {
        self.path.push(label.to_string());
        self.content_stack
            .push(node.content().unwrap_or_default().to_string());
        self.code_stack.push(node.code().map(str::to_string));
    }

    fn pop(&mut self) -> Option<String> {
        let label = self.path.pop()?;
        self.content_stack.pop();
        self.code_stack.pop();
        Some(label)
    }

    fn truncate(&mut self, depth: usize) {
        self.path.truncate(depth);
        self.content_stack.truncate(depth);
        self.code_stack.truncate(depth);
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNavigatorState {
    #[serde(default)]
    path: Vec<String>,
    #[serde(default)]
    content_stack: Vec<String>,
    #[serde(default)]
    code_stack: Vec<Option<String>>,
}

impl TryFrom<RawNavigatorState> for NavigatorState {
    type Error = NavigationError;

    fn try_from(raw: RawNavigatorState) -> Result<Self, Self::Error> {
        let (path, content, code) = (
            raw.path.len(),
            raw.content_stack.len(),
            raw.code_stack.len(),
        );
        if content != path || code != path {
            return Err(NavigationError::MisalignedState {
                path,
                content,
                code,
            });
        }
        Ok(Self {
            path: raw.path,
            content_stack: raw.content_stack,
            code_stack: raw.code_stack,
        })
    }
}

/// One step of a navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStep<'a> {
    pub label: &'a str,
    pub content: &'a str,
    pub code: Option<&'a str>,
}

/// Everything a presentation layer needs to draw the current stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot<'a> {
    pub path: &'a [String],
    pub choices: Vec<&'a str>,
    pub kind: NodeKind,
    pub content: Option<&'a str>,
    pub code: Option<&'a str>,
    /// Most recent step first.
    pub history: Vec<HistoryStep<'a>>,
}

/// A navigation session over a borrowed decision map.
#[derive(Debug, Clone)]
pub struct Navigator<'m> {
    map: &'m DecisionMap,
    current: &'m TopicNode,
    state: NavigatorState,
}

impl<'m> Navigator<'m> {
    /// Starts at the root with an empty path.
    pub fn new(map: &'m DecisionMap) -> Self {
        Self {
            map,
            current: map.root(),
            state: NavigatorState::default(),
        }
    }

    /// Rebuilds a navigator from a previously captured state.
    ///
    /// The stored path is replayed from the root and the snapshots are taken
    /// afresh from the map, so a state can never smuggle in stale content.
    pub fn resume(map: &'m DecisionMap, state: NavigatorState) -> Result<Self, NavigationError> {
        let mut navigator = Self::new(map);
        for (depth, label) in state.path.into_iter().enumerate() {
            let Some(next) = navigator.current.child(&label) else {
                return Err(NavigationError::PathDiverged { depth, label });
            };
            navigator.current = next;
            navigator.state.push(&label, next);
        }
        Ok(navigator)
    }

    pub fn map(&self) -> &'m DecisionMap {
        self.map
    }

    pub fn current(&self) -> &'m TopicNode {
        self.current
    }

    /// Explanation at the current stop; `None` at the root and at pure categories.
    pub fn current_content(&self) -> Option<&'m str> {
        self.current.content()
    }

    pub fn current_code(&self) -> Option<&'m str> {
        self.current.code()
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn into_state(self) -> NavigatorState {
        self.state
    }

    pub fn path(&self) -> &[String] {
        self.state.path()
    }

    pub fn content_stack(&self) -> &[String] {
        self.state.content_stack()
    }

    pub fn code_stack(&self) -> &[Option<String>] {
        self.state.code_stack()
    }

    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn is_at_root(&self) -> bool {
        self.state.is_empty()
    }

    /// Labels that can be passed to [`Navigator::descend`] from here.
    pub fn choices(&self) -> Vec<&'m str> {
        self.current.labels().collect()
    }

    /// One entry per step, oldest first.
    pub fn history(&self) -> Vec<HistoryStep<'_>> {
        self.state.history()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let mut history = self.history();
        history.reverse();
        Snapshot {
            path: self.path(),
            choices: self.choices(),
            kind: self.current.kind(),
            content: self.current_content(),
            code: self.current_code(),
            history,
        }
    }

    /// Moves to the child named `label`, recording its content and code.
    ///
    /// An unknown label is rejected and leaves the navigator untouched.
    pub fn descend(&mut self, label: &str) -> Result<&'m TopicNode, NavigationError> {
        let Some(next) = self.current.child(label) else {
            let suggestion = self.closest_choice(label);
            warn!(label, ?suggestion, path = ?self.state.path, "Rejected invalid transition");
            return Err(NavigationError::InvalidTransition {
                label: label.to_string(),
                suggestion,
            });
        };

        self.current = next;
        self.state.push(label, next);
        debug!(label, depth = self.depth(), kind = ?next.kind(), "Descended");
        Ok(next)
    }

    /// Steps back one level. Returns the label that was undone, or `None` at
    /// the root, where undo does nothing.
    pub fn undo(&mut self) -> Option<String> {
        let label = self.state.pop()?;
        self.current = self.replay();
        debug!(%label, depth = self.depth(), "Undid step");
        Some(label)
    }

    /// Truncates the path to `depth` steps and returns how many were dropped.
    /// Asking for a depth at or beyond the current one changes nothing.
    pub fn backtrack(&mut self, depth: usize) -> usize {
        let dropped = self.depth().saturating_sub(depth);
        if dropped > 0 {
            self.state.truncate(depth);
            self.current = self.replay();
            debug!(depth, dropped, "Backtracked");
        }
        dropped
    }

    /// Returns to the root with an empty path.
    pub fn reset(&mut self) {
        self.state = NavigatorState::default();
        self.current = self.map.root();
        debug!("Navigator reset");
    }

    // Every prefix of a path accepted by `descend` resolves, so the root
    // fallback is never taken.
    fn replay(&self) -> &'m TopicNode {
        self.map
            .resolve(self.state.path())
            .unwrap_or_else(|| self.map.root())
    }

    fn closest_choice(&self, label: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.current
            .labels()
            .filter_map(|choice| matcher.fuzzy_match(choice, label).map(|score| (score, choice)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, choice)| choice.to_string())
    }
}

impl PartialEq for Navigator<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.map, other.map)
            && ptr::eq(self.current, other.current)
            && self.state == other.state
    }
}

impl Eq for Navigator<'_> {}
