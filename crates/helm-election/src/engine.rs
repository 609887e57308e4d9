//! Election/lease engine.
//!
//! Owns leadership status for one process. Acquisition
//! ([`ElectionEngine::become_leader`]) competes for a single versioned
//! leader object; maintenance is a background renewal task that rewrites
//! the object to advance its version and prove liveness. Any version this
//! process did not write means leadership is gone: a one-way transition
//! back to follower for the current term.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use helm_store::{path, ChildEntry, CoordStore, Precondition, StoreError, Version, UNKNOWN_VERSION};

use crate::config::ElectionConfig;
use crate::error::{ElectionError, Result};
use crate::renewer;

/// Leadership status as published on the watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadershipStatus {
    /// This process holds the lease.
    Leader,
    /// This process does not hold the lease (initial state, and the state
    /// re-entered on any detected loss).
    Follower,
}

/// Outcome of one renewal attempt, consumed by the renewer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenewOutcome {
    /// Lease rewritten; version advanced.
    Renewed,
    /// Transient store failure; retry sooner than the normal cadence.
    Retry,
    /// Version conflict or missing object: leadership is gone.
    Lost,
}

struct ElectionState {
    /// Normalized path of the leader object; empty until `become_leader`.
    object_path: String,
    /// Payload written on every create/renewal; identifies this candidate.
    leader_info: Bytes,
    /// Version from our most recent read/write of the leader object.
    /// [`UNKNOWN_VERSION`] before the first observation of a term.
    last_seen_version: Version,
    /// Renewal task for the current term, if one is running.
    renewer: Option<JoinHandle<()>>,
}

/// Leader election engine. Construct once per participant, share via `Arc`.
pub struct ElectionEngine {
    store: Arc<dyn CoordStore>,
    config: ElectionConfig,
    leader: AtomicBool,
    electing: AtomicBool,
    state: Mutex<ElectionState>,
    status_tx: watch::Sender<LeadershipStatus>,
    status_rx: watch::Receiver<LeadershipStatus>,
}

impl ElectionEngine {
    pub fn new(store: Arc<dyn CoordStore>, config: ElectionConfig) -> Result<Self> {
        config.validate()?;
        let (status_tx, status_rx) = watch::channel(LeadershipStatus::Follower);
        Ok(Self {
            store,
            config,
            leader: AtomicBool::new(false),
            electing: AtomicBool::new(false),
            state: Mutex::new(ElectionState {
                object_path: String::new(),
                leader_info: Bytes::new(),
                last_seen_version: UNKNOWN_VERSION,
                renewer: None,
            }),
            status_tx,
            status_rx,
        })
    }

    /// Whether this process currently believes it holds the lease.
    pub fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }

    /// Current leadership status.
    pub fn status(&self) -> LeadershipStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to leadership status changes.
    pub fn subscribe(&self) -> watch::Receiver<LeadershipStatus> {
        self.status_rx.clone()
    }

    pub fn instance_id(&self) -> &str {
        &self.config.instance_id
    }

    pub(crate) fn config(&self) -> &ElectionConfig {
        &self.config
    }

    /// Version of the leader object from our most recent read or write;
    /// [`UNKNOWN_VERSION`] before the first observation.
    pub fn last_seen_version(&self) -> Version {
        self.state.lock().last_seen_version
    }

    /// Compete for the leader object until this process wins.
    ///
    /// Suspends between observations; store outages are logged and retried
    /// indefinitely, so the only errors surfaced are a malformed
    /// `object_path` and [`ElectionError::AlreadyRunning`]. On return this
    /// process is leader and, unless the renew interval is zero, the
    /// renewal task is running.
    pub async fn become_leader(
        self: Arc<Self>,
        object_path: &str,
        leader_info: Bytes,
    ) -> Result<()> {
        let object_path = path::validate(object_path)?;

        if self.electing.swap(true, Ordering::SeqCst) {
            return Err(ElectionError::AlreadyRunning);
        }

        {
            let mut state = self.state.lock();
            state.object_path = object_path.clone();
            state.leader_info = leader_info;
            // Fresh term: earlier observations say nothing about liveness now.
            state.last_seen_version = UNKNOWN_VERSION;
        }

        info!(
            instance_id = %self.config.instance_id,
            object_path = %object_path,
            "Starting leader election"
        );

        loop {
            match self.store.read(&object_path).await {
                Ok((_, version)) => {
                    let observed = self.state.lock().last_seen_version;
                    if observed != UNKNOWN_VERSION && version == observed {
                        // Unchanged across a full check interval: the
                        // incumbent is presumed dead. Steal the object,
                        // conditioned on it still not having moved. The
                        // payload is re-read from state so a
                        // set_leader_info during the wait cycle reaches
                        // the winning write.
                        let payload = self.state.lock().leader_info.clone();
                        match self
                            .store
                            .write(&object_path, payload, Precondition::Version(version))
                            .await
                        {
                            Ok(new_version) => {
                                Self::install_leadership(&self, new_version);
                                return Ok(());
                            }
                            Err(StoreError::VersionConflict { .. }) | Err(StoreError::NotFound) => {
                                debug!(
                                    instance_id = %self.config.instance_id,
                                    "Leader object moved during takeover; incumbent is alive"
                                );
                                self.state.lock().last_seen_version = UNKNOWN_VERSION;
                            }
                            Err(e) => {
                                warn!(error = %e, "Takeover write failed; retrying");
                                sleep(self.config.connection_retry_interval).await;
                            }
                        }
                    } else {
                        self.state.lock().last_seen_version = version;
                        sleep(self.config.check_leader_interval).await;
                    }
                }
                Err(StoreError::NotFound) => {
                    let payload = self.state.lock().leader_info.clone();
                    match self.create_with_ancestors(&object_path, payload).await {
                        Ok(version) => {
                            Self::install_leadership(&self, version);
                            return Ok(());
                        }
                        Err(StoreError::AlreadyExists) => {
                            // Another candidate created it first; re-read
                            // and fall back to watching its version.
                            debug!(
                                instance_id = %self.config.instance_id,
                                "Lost creation race for leader object"
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "Leader object creation failed; retrying");
                            sleep(self.config.connection_retry_interval).await;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Leader object read failed; retrying");
                    sleep(self.config.connection_retry_interval).await;
                }
            }
        }
    }

    /// Replace the identity payload used for future writes.
    ///
    /// When currently leader, pushes the new payload immediately so other
    /// candidates observe it without a leadership handoff; a transient
    /// failure here is left to the renewer's retry cadence.
    pub async fn set_leader_info(&self, leader_info: Bytes) {
        self.state.lock().leader_info = leader_info;
        if self.is_leader() {
            let _ = self.update_leader_object().await;
        }
    }

    /// Verify leadership against the store.
    ///
    /// Returns true while the leader object is still at the version this
    /// process last wrote. Any other version, or a missing object, clears
    /// leadership and stops the renewer. A transient read failure keeps
    /// leadership; the renewal loop owns retrying.
    pub async fn check_leader(&self) -> bool {
        if !self.is_leader() {
            return false;
        }
        let (object_path, expected) = {
            let state = self.state.lock();
            (state.object_path.clone(), state.last_seen_version)
        };
        match self.store.read(&object_path).await {
            Ok((_, version)) if version == expected => true,
            Ok((_, version)) => {
                debug!(
                    instance_id = %self.config.instance_id,
                    expected, observed = version,
                    "Leader object changed underneath us"
                );
                self.mark_lost();
                false
            }
            Err(StoreError::NotFound) => {
                self.mark_lost();
                false
            }
            Err(e) => {
                warn!(error = %e, "Leader check failed; keeping leadership");
                true
            }
        }
    }

    /// Rewrite the leader object to advance its version (lease renewal).
    pub(crate) async fn update_leader_object(&self) -> RenewOutcome {
        let (object_path, leader_info, expected) = {
            let state = self.state.lock();
            (
                state.object_path.clone(),
                state.leader_info.clone(),
                state.last_seen_version,
            )
        };
        match self
            .store
            .write(&object_path, leader_info, Precondition::Version(expected))
            .await
        {
            Ok(version) => {
                self.state.lock().last_seen_version = version;
                debug!(
                    instance_id = %self.config.instance_id,
                    version,
                    "Renewed leadership lease"
                );
                RenewOutcome::Renewed
            }
            Err(StoreError::VersionConflict { .. }) | Err(StoreError::NotFound) => {
                self.mark_lost();
                RenewOutcome::Lost
            }
            Err(e) => {
                warn!(error = %e, "Lease renewal failed; will retry");
                RenewOutcome::Retry
            }
        }
    }

    /// Stop renewing and clear the local leader flag.
    ///
    /// The leader object itself is left in place; another candidate claims
    /// it once its version stops moving.
    pub fn shutdown(&self) {
        let handle = self.state.lock().renewer.take();
        if let Some(handle) = handle {
            handle.abort();
        }
        if self.leader.swap(false, Ordering::SeqCst) {
            let _ = self.status_tx.send(LeadershipStatus::Follower);
            info!(
                instance_id = %self.config.instance_id,
                "Relinquished leadership on shutdown"
            );
        }
    }

    // ------------------------------------------------------------------
    // Pass-through data operations.
    //
    // Thin forwarding to the store: no retries here, errors propagate to
    // the caller, unlike the election path's deliberate built-in retries.
    // ------------------------------------------------------------------

    /// Read an object's payload; `Ok(None)` when it does not exist.
    pub async fn get(&self, object_path: &str) -> helm_store::Result<Option<Bytes>> {
        let object_path = path::validate(object_path)?;
        match self.store.read(&object_path).await {
            Ok((value, _)) => Ok(Some(value)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Unconditionally create or overwrite an object, creating missing
    /// ancestors as needed.
    pub async fn set(&self, object_path: &str, value: Bytes) -> helm_store::Result<()> {
        let object_path = path::validate(object_path)?;
        match self.store.write(&object_path, value.clone(), Precondition::Any).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => {
                match self.create_with_ancestors(&object_path, value.clone()).await {
                    Ok(_) => Ok(()),
                    Err(StoreError::AlreadyExists) => {
                        // Lost the create race; the object exists now.
                        self.store
                            .write(&object_path, value, Precondition::Any)
                            .await
                            .map(|_| ())
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Remove an object and its subtree. Idempotent: removing a missing
    /// object succeeds.
    pub async fn remove(&self, object_path: &str) -> helm_store::Result<()> {
        let object_path = path::validate(object_path)?;
        match self.store.remove(&object_path).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// List direct children; a missing parent yields an empty listing.
    pub async fn get_children(&self, object_path: &str) -> helm_store::Result<Vec<ChildEntry>> {
        let object_path = path::validate(object_path)?;
        match self.store.list_children(&object_path).await {
            Ok(children) => Ok(children),
            Err(StoreError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Internals.
    // ------------------------------------------------------------------

    /// Record a won election: set the leader flag, remember the version we
    /// wrote, start the renewer, publish the status change.
    fn install_leadership(engine: &Arc<Self>, version: Version) {
        {
            let mut state = engine.state.lock();
            state.last_seen_version = version;
        }
        engine.leader.store(true, Ordering::SeqCst);
        if !engine.config.renew_interval.is_zero() {
            let handle = renewer::spawn(Arc::clone(engine));
            engine.state.lock().renewer = Some(handle);
        }
        let _ = engine.status_tx.send(LeadershipStatus::Leader);
        engine.electing.store(false, Ordering::SeqCst);
        info!(
            instance_id = %engine.config.instance_id,
            version,
            "Acquired leadership"
        );
    }

    /// One-way transition out of leadership for this term. Loss of
    /// leadership is a state change with a notification, not an error.
    fn mark_lost(&self) {
        if !self.leader.swap(false, Ordering::SeqCst) {
            return;
        }
        let handle = self.state.lock().renewer.take();
        if let Some(handle) = handle {
            handle.abort();
        }
        let _ = self.status_tx.send(LeadershipStatus::Follower);
        warn!(instance_id = %self.config.instance_id, "Lost leadership");
    }

    /// Create `object_path`, creating any missing ancestors (with empty
    /// payloads) first. An ancestor created concurrently by another
    /// candidate is fine.
    async fn create_with_ancestors(
        &self,
        object_path: &str,
        value: Bytes,
    ) -> helm_store::Result<Version> {
        loop {
            match self.store.create(object_path, value.clone()).await {
                Err(StoreError::NotFound) => self.create_ancestors(object_path).await?,
                other => return other,
            }
        }
    }

    async fn create_ancestors(&self, object_path: &str) -> helm_store::Result<()> {
        let segments: Vec<&str> = object_path.split('/').collect();
        let mut prefix = String::new();
        for segment in &segments[..segments.len() - 1] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            match self.store.create(&prefix, Bytes::new()).await {
                Ok(_) | Err(StoreError::AlreadyExists) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ElectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElectionEngine")
            .field("instance_id", &self.config.instance_id)
            .field("is_leader", &self.is_leader())
            .finish()
    }
}
