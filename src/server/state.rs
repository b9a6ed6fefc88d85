//! Shared application state.

use std::time::Instant;

use crate::pipeline::AgentMatcher;

/// State shared by all handlers
pub struct AppState {
    pub matcher: AgentMatcher,
    started_at: Instant,
}

impl AppState {
    pub fn new(matcher: AgentMatcher) -> Self {
        Self {
            matcher,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
