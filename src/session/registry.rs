//! In-memory registry of live sessions keyed by user
//!
//! Sessions live only for the process lifetime; ending a session hands back
//! its final export so the caller can persist it if it wants to.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::session::session::{CoachSession, ConversationExport};

/// Active sessions, at most one per user.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, CoachSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session under its user id, replacing any existing one.
    pub fn create(&mut self, session: CoachSession) -> &mut CoachSession {
        let user_id = session.user_id().to_string();
        match self.sessions.entry(user_id) {
            Entry::Occupied(mut entry) => {
                entry.insert(session);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(session),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&CoachSession> {
        self.sessions.get(user_id)
    }

    pub fn get_mut(&mut self, user_id: &str) -> Option<&mut CoachSession> {
        self.sessions.get_mut(user_id)
    }

    /// Removes the user's session and returns its final export.
    pub fn end(&mut self, user_id: &str) -> Option<ConversationExport> {
        self.sessions.remove(user_id).map(|s| s.export())
    }

    /// Users with a live session, sorted for stable output.
    pub fn active_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.sessions.keys().cloned().collect();
        users.sort();
        users
    }
}
