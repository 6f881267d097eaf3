//! Authenticated session context.
//!
//! The engine never owns authentication: the presentation layer logs the
//! user in and out against the hosted backend and injects the resulting
//! session into every engine entry point. The context is replaced
//! wholesale on login/logout, never mutated in place.

use crate::error::{EngineError, Result};

/// Session context passed into every operation that may touch the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Option<String>,
}

impl SessionContext {
    /// Session with no logged-in user. All remote operations become
    /// no-ops or fail with `Unauthenticated`, local operations proceed.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Session for an authenticated user.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Current user ID, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// User ID or `Unauthenticated` for operations with no local fallback.
    pub fn require_user(&self) -> Result<&str> {
        self.user_id.as_deref().ok_or(EngineError::Unauthenticated)
    }
}
