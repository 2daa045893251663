//! Session-keyed storage for pipeline runs.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::pipeline::PipelineRun;

/// Shared handle to one session's run.
///
/// Hold the lock for the whole transition: a second action on the same
/// session waits until the first has finished.
pub type SessionHandle = Arc<Mutex<PipelineRun>>;

/// In-memory map from session ID to that session's run.
///
/// Sessions share nothing but the map. Entries live until removed.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a run under a new session ID and returns the ID.
    pub fn insert(&self, mut run: PipelineRun) -> Uuid {
        let session_id = Uuid::new_v4();
        run.set_session_id(session_id);
        tracing::debug!(session_id = %session_id, run_id = %run.run_id(), "Session created");
        self.sessions.insert(session_id, Arc::new(Mutex::new(run)));
        session_id
    }

    /// Returns the handle for a session.
    #[must_use]
    pub fn get(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&session_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Swaps in a fresh run for an existing session, waiting for any
    /// in-flight transition. Returns false if the session does not exist.
    pub async fn replace(&self, session_id: Uuid, mut run: PipelineRun) -> bool {
        let Some(handle) = self.get(session_id) else {
            return false;
        };
        run.set_session_id(session_id);
        *handle.lock().await = run;
        true
    }

    /// Ends a session and returns its handle.
    pub fn remove(&self, session_id: Uuid) -> Option<SessionHandle> {
        self.sessions.remove(&session_id).map(|(_, handle)| handle)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// IDs of all live sessions, in no particular order.
    #[must_use]
    pub fn session_ids(&self) -> Vec<Uuid> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BusinessContext, PipelineVariant};

    fn run() -> PipelineRun {
        PipelineRun::new(BusinessContext::new("Austin, TX"), PipelineVariant::CampaignBriefing)
    }

    #[tokio::test]
    async fn test_insert_assigns_session_id() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let id = store.insert(run());
        let handle = store.get(id).unwrap();
        assert_eq!(handle.lock().await.identity().session_id, Some(id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.session_ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.insert(run());
        let b = store.insert(run());
        assert_ne!(a, b);

        let run_a = store.get(a).unwrap().lock().await.run_id();
        let run_b = store.get(b).unwrap().lock().await.run_id();
        assert_ne!(run_a, run_b);
    }

    #[tokio::test]
    async fn test_replace_and_remove() {
        let store = SessionStore::new();
        let id = store.insert(run());
        let before = store.get(id).unwrap().lock().await.run_id();

        let fresh = run();
        let fresh_id = fresh.run_id();
        assert!(store.replace(id, fresh).await);
        let handle = store.get(id).unwrap();
        let guard = handle.lock().await;
        assert_eq!(guard.run_id(), fresh_id);
        assert_ne!(guard.run_id(), before);
        assert_eq!(guard.identity().session_id, Some(id));
        drop(guard);

        assert!(store.remove(id).is_some());
        assert!(store.get(id).is_none());
        assert!(!store.replace(id, run()).await);
    }
}
