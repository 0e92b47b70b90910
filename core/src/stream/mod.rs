// ## `mod.rs`: public facade + re-exports

//! stream: checkpointed decode loop and per-stream orchestration.
//!
//! Data flow:
//! bytes → `Framer` → frames → `RecordCodec` → value →
//! `CheckpointedDecoder` (timestamp + state) → `StateStore`, then
//! `ParticleSink`.

pub mod key;
pub mod particle;
pub mod ports;
pub mod decoder;
pub mod orchestrator;

pub use key::StreamKey;
pub use particle::Particle;
pub use ports::{
    ExceptionSink, IngestFailure, MemoryStateStore, ParticleSink, RecordingExceptionSink,
    StateStore, StoreError, VecSink,
};
pub use decoder::{CheckpointedDecoder, DecoderPhase, PullSummary};
pub use orchestrator::{StreamOrchestrator, StreamStatus};
