//! Shared plumbing for the Helm workspace.
//!
//! Currently this is just the logging bootstrap; election and store logic
//! live in their own crates.

pub mod logging;
