//! Session Store
//!
//! Study sessions live in memory for the lifetime of the process. Every lookup
//! is scoped to the user that created the session.

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::StudySession;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, StudySession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session at the root of the map.
    pub async fn create(&self, user_id: &str) -> StudySession {
        let session = StudySession::new(user_id.to_string());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    /// Retrieves a single session by its ID, scoped to a specific user.
    pub async fn get(&self, id: Uuid, user_id: &str) -> Option<StudySession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| s.user_id == user_id)
            .cloned()
    }

    /// Lists a user's sessions, most recently updated first.
    pub async fn list(&self, user_id: &str) -> Vec<StudySession> {
        let mut sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }

    /// Applies `op` to a session under the write lock.
    ///
    /// Returns `None` when the session does not exist for this user. `op` sees
    /// the bumped `updated_at`; when it fails the session is left untouched.
    pub async fn update<T, E, F>(&self, id: Uuid, user_id: &str, op: F) -> Option<Result<T, E>>
    where
        F: FnOnce(&mut StudySession) -> Result<T, E>,
    {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(&id).filter(|s| s.user_id == user_id)?;

        let mut draft = stored.clone();
        draft.updated_at = Utc::now();
        let result = op(&mut draft);
        if result.is_ok() {
            *stored = draft;
        }
        Some(result)
    }

    /// Deletes a session. Returns whether it existed for this user.
    pub async fn remove(&self, id: Uuid, user_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(s) if s.user_id == user_id => sessions.remove(&id).is_some(),
            _ => false,
        }
    }
}
