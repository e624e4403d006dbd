//! `courtside-worker` library crate.
//!
//! Batch drivers behind the `courtside` binary. Re-exported for
//! integration testing; the entrypoint lives in `main.rs`.

pub mod config;
pub mod context;
pub mod failures;
pub mod jobs;
pub mod report;
