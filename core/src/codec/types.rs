use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub trait RecordCodec: Send {
    type Output: Clone + Debug + Send;
    type State: Default + Clone + Send;

    fn decode(&self, frame: &[u8], state: &mut Self::State) -> Result<Self::Output, CodecError>;
}

/// Codec for fixed-width binary records.
pub trait FixedWidthCodec: RecordCodec {
    fn record_size(&self) -> usize;
}

/// Global metadata carried by a source's trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub time_on: u32,
    pub time_off: u32,
    pub record_count: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("end-of-profile marker where a record was expected")]
    EndMarker,

    #[error("malformed record: {0}")]
    Malformed(String),
}
