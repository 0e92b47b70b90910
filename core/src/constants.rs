//! constants.rs
//! Wire constants for the WFP C-file format and engine defaults.

/// Bytes per fixed-width WFP C-file data record.
pub const WFP_RECORD_SIZE: usize = 11;

/// Byte value repeated across the end-of-profile marker.
pub const EOP_MARKER_BYTE: u8 = 0xFF;

/// End-of-profile marker: one record's worth of all-one bits.
pub const EOP_MARKER: [u8; WFP_RECORD_SIZE] = [EOP_MARKER_BYTE; WFP_RECORD_SIZE];

/// Two big-endian u32 values (time_on, time_off) follow the marker.
pub const TRAILER_TIMESTAMPS_LEN: usize = 8;

/// Fixed trailer length: marker + timestamps.
pub const WFP_TRAILER_LEN: usize = WFP_RECORD_SIZE + TRAILER_TIMESTAMPS_LEN;

/// Extra bytes tolerated after the trailer timestamps.
pub const DEFAULT_TRAILER_PAD: usize = 8;

/// Defaults when config fields are omitted
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4 * 1024; // 4 KiB
pub const DEFAULT_PULL_BUDGET: usize = 64;
pub const DEFAULT_JOURNAL_ROTATION_LIMIT: usize = 10_000;

/// Max read chunk sanity bound (16 MiB).
pub const MAX_READ_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Journal line prefix for checkpoint entries.
pub const JOURNAL_STATE_PREFIX: &str = "STATE: ";

/// Hex characters of the blake3 digest kept per journal line.
pub const JOURNAL_CHECKSUM_LEN: usize = 8;

/// zstd level for archived journals.
pub const JOURNAL_ARCHIVE_ZSTD_LEVEL: i32 = 3;
