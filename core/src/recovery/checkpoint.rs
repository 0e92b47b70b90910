//! recovery/checkpoint.rs
//! The minimal state needed to resume decoding without loss or duplication.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trailer::TrailerInfo;

/// Checkpoint owned by one decoder for one (stream key, source) pair.
///
/// Invariants:
/// - `position` only grows, by the byte length of frames that were decoded
///   and handed over (or explicitly skipped).
/// - `metadata_sent` flips once, after the metadata particle was handed over.
/// - `records_read` grows by one per emitted sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct ParserState {
    pub position: u64,
    pub records_read: u64,
    pub metadata_sent: bool,
    /// Frames stepped over after a decode failure.
    #[serde(default)]
    pub records_skipped: u64,
}

impl ParserState {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn new(position: u64, records_read: u64, metadata_sent: bool) -> Self {
        Self { position, records_read, metadata_sent, records_skipped: 0 }
    }

    pub fn is_fresh(&self) -> bool {
        *self == Self::default()
    }

    /// Index of the next record in the source.
    #[inline]
    pub fn record_index(&self) -> u64 {
        self.records_read + self.records_skipped
    }

    pub fn with_metadata_sent(self) -> Self {
        Self { metadata_sent: true, ..self }
    }

    pub fn after_sample(self, frame_len: u64) -> Self {
        Self {
            position: self.position + frame_len,
            records_read: self.records_read + 1,
            ..self
        }
    }

    pub fn after_skip(self, frame_len: u64) -> Self {
        Self {
            position: self.position + frame_len,
            records_skipped: self.records_skipped + 1,
            ..self
        }
    }

    /// True once metadata and every record of the source are accounted for.
    pub fn is_complete(&self, trailer: &TrailerInfo) -> bool {
        self.metadata_sent && self.record_index() >= trailer.record_count
    }

    /// Check a restored state against the source it claims to describe.
    pub fn validate(&self, trailer: &TrailerInfo, record_size: usize) -> Result<(), CheckpointError> {
        if self.record_index() > trailer.record_count {
            return Err(CheckpointError::RecordsExceedCount {
                records: self.record_index(),
                count: trailer.record_count,
            });
        }
        if !self.metadata_sent && self.record_index() > 0 {
            return Err(CheckpointError::SamplesWithoutMetadata { records: self.record_index() });
        }
        if self.position > trailer.data_len {
            return Err(CheckpointError::PositionPastData {
                position: self.position,
                data_len: trailer.data_len,
            });
        }
        let expected = self.record_index() * record_size as u64;
        if self.position != expected {
            return Err(CheckpointError::PositionMismatch { position: self.position, expected });
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "ParserState(pos: {}, read: {}, skipped: {}, metadata: {})",
            self.position, self.records_read, self.records_skipped, self.metadata_sent
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("{records} records exceed trailer count {count}")]
    RecordsExceedCount { records: u64, count: u64 },

    #[error("{records} records checkpointed before metadata")]
    SamplesWithoutMetadata { records: u64 },

    #[error("position {position} beyond data region of {data_len} bytes")]
    PositionPastData { position: u64, data_len: u64 },

    #[error("position {position} does not match record boundary {expected}")]
    PositionMismatch { position: u64, expected: u64 },
}
