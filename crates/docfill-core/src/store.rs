//! Session storage
//!
//! The store is the only mutable state shared across turns. It is injected
//! into [`crate::SessionManager`] so tests and embedders can bring their own.

use crate::session::{Session, SessionId};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Keyed session storage with read-your-writes consistency
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Option<Session>;

    /// Insert or replace, refreshing `updated_at`
    async fn set(&self, session: Session);

    async fn has(&self, id: &SessionId) -> bool;

    /// Remove a session, returning it if present
    async fn delete(&self, id: &SessionId) -> Option<Session>;

    /// Evict sessions idle longer than `max_age`; returns the evicted count
    async fn cleanup(&self, max_age: Duration) -> usize;

    async fn len(&self) -> usize;
}

/// Process-local store over a concurrent map
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    async fn set(&self, mut session: Session) {
        session.touch();
        self.sessions.insert(session.id, session);
    }

    async fn has(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    async fn delete(&self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    async fn cleanup(&self, max_age: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.updated_at >= cutoff);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "swept idle sessions");
        }
        evicted
    }

    async fn len(&self) -> usize {
        self.sessions.len()
    }
}
