use thiserror::Error;

use crate::constants::{
    DEFAULT_TRAILER_PAD, EOP_MARKER_BYTE, TRAILER_TIMESTAMPS_LEN, WFP_RECORD_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerLayout {
    /// Bytes per data record; also the marker length.
    pub record_size: usize,
    pub marker_byte: u8,
    /// Extra bytes tolerated after the timestamps.
    pub pad: usize,
}

impl TrailerLayout {
    pub const fn new(record_size: usize, pad: usize) -> Self {
        Self { record_size, marker_byte: EOP_MARKER_BYTE, pad }
    }

    /// WFP C-file layout: 11-byte records, 19-byte trailer.
    pub const fn wfp() -> Self {
        Self::new(WFP_RECORD_SIZE, DEFAULT_TRAILER_PAD)
    }

    pub fn with_pad(mut self, pad: usize) -> Self {
        self.pad = pad;
        self
    }

    /// `F`: marker + timestamps.
    pub const fn trailer_len(&self) -> usize {
        self.record_size + TRAILER_TIMESTAMPS_LEN
    }

    /// Bytes read from the end of the source.
    pub const fn window_len(&self) -> usize {
        self.trailer_len() + self.pad
    }

    pub fn marker(&self) -> Vec<u8> {
        vec![self.marker_byte; self.record_size]
    }
}

impl Default for TrailerLayout {
    fn default() -> Self {
        Self::wfp()
    }
}

/// Global metadata recovered from the trailer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailerInfo {
    pub time_on: u32,
    pub time_off: u32,
    pub record_count: u64,
    /// Seconds between consecutive records; 0 when there are no records.
    pub time_increment: f64,
    /// Byte length of the data region, equal to the marker offset.
    pub data_len: u64,
    /// Bytes found after the timestamps.
    pub extra_bytes: u64,
    pub source_len: u64,
}

impl TrailerInfo {
    /// Interpolated timestamp of record `index`, computed from the index
    /// rather than accumulated so resumes reproduce it exactly.
    #[inline]
    pub fn timestamp_for(&self, index: u64) -> f64 {
        self.time_on as f64 + self.time_increment * index as f64
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrailerError {
    #[error("short source: {length} bytes cannot hold a {trailer_len}-byte trailer")]
    ShortSource { length: u64, trailer_len: usize },

    #[error("missing trailer: no end-of-profile marker in {window_len} bytes at offset {window_start}")]
    MissingTrailer { window_start: u64, window_len: usize },

    #[error("non-integral record count: {data_len} data bytes is not a multiple of {record_size}")]
    NonIntegralRecordCount { data_len: u64, record_size: usize },
}
