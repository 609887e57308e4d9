//! Leadership-aware wrapper that gates work on election status.

use std::sync::Arc;

use crate::engine::{ElectionEngine, LeadershipStatus};

/// Gates operations on the engine's leadership status.
pub struct LeaderGate {
    engine: Arc<ElectionEngine>,
}

impl LeaderGate {
    pub fn new(engine: Arc<ElectionEngine>) -> Self {
        Self { engine }
    }

    /// Run a closure only if this process is currently leader.
    pub async fn run_if_leader<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        if self.engine.is_leader() {
            Some(f().await)
        } else {
            None
        }
    }

    /// Check if leader-only work should proceed.
    pub fn should_process(&self) -> bool {
        self.engine.is_leader()
    }

    /// Wait until this process becomes leader.
    pub async fn wait_for_leadership(&self) {
        let mut rx = self.engine.subscribe();
        while *rx.borrow() != LeadershipStatus::Leader {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
