//! telemetry/mod.rs
//! Per-stream ingestion counters, stage timers and immutable snapshots.
//!
//! The engine never logs; these counters are its observability surface.
//! Skipped noise bytes and corrupt frames are counted here so that callers
//! can alert on them.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
