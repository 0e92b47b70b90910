//! codec/mod.rs
//! Pure per-format record decoders.
//!
//! A codec maps one frame's bytes, plus state threaded in by the owning
//! decoder, to a value or a `CodecError`. Codecs hold no shared mutable
//! state; anything carried between records lives in `RecordCodec::State`,
//! which each decoder instance owns.

pub mod types;
pub mod ctd;

pub use types::*;
pub use ctd::{CtdSample, WfpCtdCodec};
