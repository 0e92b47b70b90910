//! particle-core
//!
//! Framing and checkpointed decode engine for instrument telemetry.
//! Pure Rust, synchronous, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod source;

// Byte layers
pub mod framing;
pub mod trailer;
pub mod codec;

pub mod telemetry;
pub mod recovery;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{CtdSample, FixedWidthCodec, Metadata, RecordCodec, WfpCtdCodec};
    pub use crate::config::{CorruptRecordPolicy, IngestConfig};
    pub use crate::recovery::{CheckpointJournal, ParserState};
    pub use crate::source::{ByteSource, FileSource, InputSource, MemorySource};
    pub use crate::stream::{
        CheckpointedDecoder, ExceptionSink, Particle, ParticleSink, StateStore, StreamKey,
        StreamOrchestrator,
    };
    pub use crate::types::IngestError;
}
