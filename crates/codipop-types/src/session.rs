//! Acting-user context.

use serde::{Deserialize, Serialize};

/// Default user id when none is supplied.
pub const DEFAULT_USER_ID: &str = "local";

/// The user on whose behalf wardrobe and history operations run.
///
/// Passed explicitly into services and the orchestrator instead of being read
/// from a process-wide auth singleton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
}

impl UserSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Default for UserSession {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}
