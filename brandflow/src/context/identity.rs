//! Run identity for tracking pipeline runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a pipeline run and the session that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this run.
    pub run_id: Uuid,

    /// The session the run belongs to, once stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,

    /// When the run was created (ISO 8601).
    pub created_at: String,
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            session_id: None,
            created_at: crate::core::iso_timestamp(),
        }
    }

    /// Sets the session ID.
    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Returns the run ID as a string.
    #[must_use]
    pub fn run_id_str(&self) -> String {
        self.run_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_identity_new() {
        let a = RunIdentity::new();
        let b = RunIdentity::new();
        assert_ne!(a.run_id, b.run_id);
        assert!(a.session_id.is_none());
    }

    #[test]
    fn test_with_session_id() {
        let session = Uuid::new_v4();
        let identity = RunIdentity::new().with_session_id(session);
        assert_eq!(identity.session_id, Some(session));

        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["session_id"], serde_json::json!(session.to_string()));
    }
}
