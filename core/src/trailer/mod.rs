//! trailer/mod.rs
//! Fixed-size footer of bounded (file-shaped) sources.
//!
//! Layout notes:
//! - `R` bytes of end-of-profile marker (all one-bits), then `time_on` and
//!   `time_off` as big-endian u32 seconds.
//! - Up to `pad` extra bytes may follow the timestamps; the marker is
//!   searched for inside the padded window rather than assumed at `L - F`.
//! - The result is derived from the source alone, so it is recomputed on
//!   every resume and never persisted.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
