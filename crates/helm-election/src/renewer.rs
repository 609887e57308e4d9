//! Lease renewal task.
//!
//! Runs only while the owning engine is leader. Normal cadence is the
//! configured renew interval; a transient store failure shortens the next
//! delay to the retry interval so several attempts fit inside a
//! challenger's detection window. A version conflict means leadership is
//! already gone (handled inside the engine) and the task exits.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::engine::{ElectionEngine, RenewOutcome};

pub(crate) fn spawn(engine: Arc<ElectionEngine>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let renew_interval = engine.config().renew_interval;
        let retry_interval = engine.config().renew_retry_interval;
        let mut delay = renew_interval;

        loop {
            sleep(delay).await;
            if !engine.is_leader() {
                break;
            }
            match engine.update_leader_object().await {
                RenewOutcome::Renewed => delay = renew_interval,
                RenewOutcome::Retry => delay = retry_interval,
                RenewOutcome::Lost => break,
            }
        }

        debug!(instance_id = %engine.instance_id(), "Lease renewer stopped");
    })
}
