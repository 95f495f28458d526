//! Application state for the Salary Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::session::Session;

/// Shared application state.
///
/// Wraps the loaded [`Session`] so every handler sees the same employees
/// and license status.
#[derive(Clone)]
pub struct AppState {
    session: Arc<Session>,
}

impl AppState {
    /// Creates a new application state around `session`.
    pub fn new(session: Session) -> Self {
        Self::from_shared(Arc::new(session))
    }

    /// Creates a state sharing an existing session.
    pub fn from_shared(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Returns the session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}
