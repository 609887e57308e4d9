//! Election timing configuration.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{ElectionError, Result};

/// Timing parameters for election and lease renewal.
///
/// The intervals are nested: a leader must get several renewal attempts
/// (initial delay of `renew_interval`, then retries every
/// `renew_retry_interval`) inside a challenger's `check_leader_interval`
/// detection window. [`validate`](Self::validate) rejects configurations
/// that break that ordering.
#[derive(Debug, Clone)]
pub struct ElectionConfig {
    /// Delay before re-trying the store after a connection-level failure
    /// during acquisition.
    pub connection_retry_interval: Duration,

    /// How long a challenger waits between observations of the leader
    /// object. An unchanged version across one full interval means the
    /// incumbent is presumed dead.
    pub check_leader_interval: Duration,

    /// Renewal cadence while leader. `Duration::ZERO` disables the renewer
    /// entirely; tests use this to drive leadership transitions manually.
    pub renew_interval: Duration,

    /// Retry cadence after a transient renewal failure. Must be materially
    /// smaller than `renew_interval`.
    pub renew_retry_interval: Duration,

    /// Identity of this process in logs. Not written to the store; the
    /// leader object payload is whatever the caller passes to
    /// `become_leader`.
    pub instance_id: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            connection_retry_interval: Duration::from_secs(1),
            check_leader_interval: Duration::from_secs(10),
            renew_interval: Duration::from_secs(2),
            renew_retry_interval: Duration::from_millis(500),
            instance_id: Uuid::new_v4().to_string(),
        }
    }
}

impl ElectionConfig {
    pub fn with_connection_retry_interval(mut self, interval: Duration) -> Self {
        self.connection_retry_interval = interval;
        self
    }

    pub fn with_check_leader_interval(mut self, interval: Duration) -> Self {
        self.check_leader_interval = interval;
        self
    }

    pub fn with_renew_interval(mut self, interval: Duration) -> Self {
        self.renew_interval = interval;
        self
    }

    pub fn with_renew_retry_interval(mut self, interval: Duration) -> Self {
        self.renew_retry_interval = interval;
        self
    }

    pub fn with_instance_id(mut self, id: String) -> Self {
        self.instance_id = id;
        self
    }

    /// Check the interval ordering invariant.
    pub fn validate(&self) -> Result<()> {
        if self.renew_interval.is_zero() {
            // Renewer disabled; nothing to order.
            return Ok(());
        }
        if self.renew_retry_interval >= self.renew_interval
            || self.renew_interval >= self.check_leader_interval
        {
            return Err(ElectionError::Config(format!(
                "interval ordering violated: renew_retry ({:?}) < renew ({:?}) < check_leader ({:?}) required",
                self.renew_retry_interval, self.renew_interval, self.check_leader_interval,
            )));
        }
        Ok(())
    }
}
