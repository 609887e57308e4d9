//! Lease-based leader election over a versioned coordination store.
//!
//! One process in a fleet holds leadership by periodically rewriting a
//! single versioned object (the leader object); the others watch that
//! object's version and take over when it stops moving for a full check
//! interval. There is no heartbeat payload beyond the version counter
//! itself.
//!
//! # Features
//!
//! - **Acquisition**: [`ElectionEngine::become_leader`] competes for the
//!   leader object, retrying store outages indefinitely.
//! - **Lease renewal**: while leader, a background task rewrites the object
//!   on a cadence, with a tighter retry cadence on transient failures.
//! - **Loss detection**: any version observed that this process did not
//!   write is a one-way transition back to follower, published on a watch
//!   channel.
//! - **Leader gate**: [`LeaderGate`] lets embedders gate work on
//!   leadership status.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use helm_election::{ElectionConfig, ElectionEngine, LeaderGate};
//! use helm_store::MemoryStore;
//!
//! async fn example() {
//!     let store = Arc::new(MemoryStore::new());
//!     let engine = Arc::new(
//!         ElectionEngine::new(store, ElectionConfig::default()).unwrap(),
//!     );
//!
//!     // Blocks (asynchronously) until this process wins the election.
//!     engine
//!         .clone()
//!         .become_leader("cluster/leader", Bytes::from("host-a:7000"))
//!         .await
//!         .unwrap();
//!
//!     let gate = LeaderGate::new(engine.clone());
//!     if gate.should_process() {
//!         // Do leader-only work.
//!     }
//! }
//! ```

mod config;
mod engine;
mod error;
mod gate;
mod renewer;

pub use config::ElectionConfig;
pub use engine::{ElectionEngine, LeadershipStatus};
pub use error::{ElectionError, Result};
pub use gate::LeaderGate;
