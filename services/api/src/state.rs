//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the decision map,
//! the session store and the content services shared by every handler.

use crate::sessions::SessionStore;
use leetmigo_core::{DecisionMap, Sampler, coach::Coach};
use std::sync::{Arc, Mutex};

/// The shared application state, created once at startup and passed to all handlers.
/// All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub map: Arc<DecisionMap>,
    pub sessions: Arc<SessionStore>,
    pub coach: Coach,
    /// Only held while drawing a subject, never across an await.
    pub sampler: Arc<Mutex<Sampler>>,
}
