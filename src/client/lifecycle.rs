//! Per-call streaming state machine.
//!
//! `Idle -> Connecting -> Streaming -> {Completed | Failed | Aborted}`. Failure and abort are
//! also reachable from `Connecting`. Terminal states are final.

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Idle,
    Connecting,
    Streaming,
    Completed,
    Failed,
    Aborted,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StreamState::Completed | StreamState::Failed | StreamState::Aborted
        )
    }

    fn can_move_to(self, next: StreamState) -> bool {
        use StreamState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Idle, Aborted)
                | (Connecting, Streaming)
                | (Connecting, Failed)
                | (Connecting, Aborted)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Aborted)
        )
    }
}

/// Tracks one call's state. Illegal transitions are ignored.
#[derive(Debug)]
pub struct StreamLifecycle {
    request_id: String,
    state: StreamState,
    fragments: u64,
}

impl StreamLifecycle {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            state: StreamState::Idle,
            fragments: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn fragments(&self) -> u64 {
        self.fragments
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Move to `next`. Returns whether the transition was applied.
    pub fn advance(&mut self, next: StreamState) -> bool {
        if !self.state.can_move_to(next) {
            debug!(
                request_id = self.request_id.as_str(),
                from = ?self.state,
                to = ?next,
                "ignoring illegal stream transition"
            );
            return false;
        }
        debug!(
            request_id = self.request_id.as_str(),
            from = ?self.state,
            to = ?next,
            "stream transition"
        );
        self.state = next;
        true
    }

    pub(crate) fn record_fragment(&mut self) {
        self.fragments += 1;
    }
}
