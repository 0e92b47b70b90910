use std::ops::Range;

use bytes::Bytes;
use thiserror::Error;

/// A complete record candidate cut out of the stream.
///
/// `start`/`end` are absolute offsets in the logical stream, so a frame
/// produced after a resume carries the same offsets as before the restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub start: u64,
    pub end: u64,
    pub bytes: Bytes,
}

impl Frame {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// Result of running a sieve over the current buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SieveScan {
    /// Ascending, non-overlapping frame ranges relative to the buffer start.
    pub ranges: Vec<Range<usize>>,

    /// Offset of a stop-marker: nothing at or after it is a frame.
    pub terminator: Option<usize>,

    /// Bytes before this offset can never begin a frame and may be dropped
    /// as noise even when no range was found.
    pub noise_until: usize,
}

impl SieveScan {
    pub fn empty() -> Self {
        Self::default()
    }

    /// End of the last range, or 0.
    pub fn frames_end(&self) -> usize {
        self.ranges.last().map(|r| r.end).unwrap_or(0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SieveError {
    #[error("{0} pattern must be non-empty")]
    EmptyPattern(&'static str),
}
