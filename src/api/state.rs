//! Application state for the calculation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::RuleTableProvider;

/// Shared application state.
///
/// Holds the rule tables, loaded once at startup. Tables are immutable, so
/// handlers read them concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    /// The loaded rule tables.
    tables: Arc<RuleTableProvider>,
}

impl AppState {
    /// Creates a new application state with the given rule tables.
    pub fn new(tables: RuleTableProvider) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    /// Returns a reference to the rule tables.
    pub fn tables(&self) -> &RuleTableProvider {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_app_state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppState>();
    }

    #[test]
    fn test_clones_share_tables() {
        let state = AppState::new(RuleTableProvider::builtin());
        let clone = state.clone();
        assert!(std::ptr::eq(state.tables(), clone.tables()));
    }
}
