use std::io;

use crate::{
    codec::CodecError,
    config::ConfigError,
    recovery::{CheckpointError, JournalError},
    stream::StoreError,
    trailer::TrailerError,
};

/// Unified ingestion error covering I/O, trailer integrity, record decode,
/// checkpoint validation and collaborator failures.
/// - Ergonomic `From<T>` impls enable `?` across the engine.
/// - Messages aim to be stable and contextual for the exception channel.
#[derive(Debug)]
pub enum IngestError {
    /// I/O error raised by the byte source.
    Io(io::Error),

    /// Source-wide trailer failure (`ShortSource`, `MissingTrailer`,
    /// `NonIntegralRecordCount`).
    Trailer(TrailerError),

    /// A single frame failed to decode.
    CorruptRecord {
        offset: u64,
        record_index: u64,
        source: CodecError,
    },

    /// Restored ParserState violates the checkpoint invariants.
    InvalidCheckpoint(CheckpointError),

    /// The state store refused to persist a checkpoint.
    Store(StoreError),

    /// Checkpoint journal failure outside of a state change.
    Journal(JournalError),

    /// Configuration rejected by validation.
    Config(ConfigError),

    /// Stream was marked permanently failed by an earlier fatal error.
    StreamFailed(String),

    /// No decoder is registered for the stream key.
    UnknownStream(String),
}

/// Flat error classification handed to the exception channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    ShortSource,
    MissingTrailer,
    NonIntegralRecordCount,
    CorruptRecord,
    InvalidCheckpoint,
    Store,
    Journal,
    Config,
    StreamFailed,
    UnknownStream,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Io(_) => ErrorKind::Io,
            IngestError::Trailer(TrailerError::ShortSource { .. }) => ErrorKind::ShortSource,
            IngestError::Trailer(TrailerError::MissingTrailer { .. }) => ErrorKind::MissingTrailer,
            IngestError::Trailer(TrailerError::NonIntegralRecordCount { .. }) => {
                ErrorKind::NonIntegralRecordCount
            }
            IngestError::CorruptRecord { .. } => ErrorKind::CorruptRecord,
            IngestError::InvalidCheckpoint(_) => ErrorKind::InvalidCheckpoint,
            IngestError::Store(_) => ErrorKind::Store,
            IngestError::Journal(_) => ErrorKind::Journal,
            IngestError::Config(_) => ErrorKind::Config,
            IngestError::StreamFailed(_) => ErrorKind::StreamFailed,
            IngestError::UnknownStream(_) => ErrorKind::UnknownStream,
        }
    }

    /// Source-wide failures: the caller should mark the source failed and
    /// never retry it.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ShortSource
                | ErrorKind::MissingTrailer
                | ErrorKind::NonIntegralRecordCount
                | ErrorKind::InvalidCheckpoint
        )
    }

    /// Byte offset the error refers to, when one is known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            IngestError::CorruptRecord { offset, .. } => Some(*offset),
            IngestError::Trailer(TrailerError::MissingTrailer { window_start, .. }) => {
                Some(*window_start)
            }
            IngestError::InvalidCheckpoint(CheckpointError::PositionMismatch { position, .. })
            | IngestError::InvalidCheckpoint(CheckpointError::PositionPastData { position, .. }) => {
                Some(*position)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io(e) => write!(f, "I/O error: {}", e),
            IngestError::Trailer(e) => write!(f, "trailer error: {}", e),
            IngestError::CorruptRecord { offset, record_index, source } => write!(
                f,
                "corrupt record {} at offset {}: {}",
                record_index, offset, source
            ),
            IngestError::InvalidCheckpoint(e) => write!(f, "invalid checkpoint: {}", e),
            IngestError::Store(e) => write!(f, "state store error: {}", e),
            IngestError::Journal(e) => write!(f, "journal error: {}", e),
            IngestError::Config(e) => write!(f, "config error: {}", e),
            IngestError::StreamFailed(key) => write!(f, "stream {} is permanently failed", key),
            IngestError::UnknownStream(key) => write!(f, "unknown stream {}", key),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(e) => Some(e),
            IngestError::Trailer(e) => Some(e),
            IngestError::CorruptRecord { source, .. } => Some(source),
            IngestError::InvalidCheckpoint(e) => Some(e),
            IngestError::Store(e) => Some(e),
            IngestError::Journal(e) => Some(e),
            IngestError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for IngestError {
    fn from(e: io::Error) -> Self {
        IngestError::Io(e)
    }
}

impl From<TrailerError> for IngestError {
    fn from(e: TrailerError) -> Self {
        IngestError::Trailer(e)
    }
}

impl From<CheckpointError> for IngestError {
    fn from(e: CheckpointError) -> Self {
        IngestError::InvalidCheckpoint(e)
    }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Store(e)
    }
}

impl From<JournalError> for IngestError {
    fn from(e: JournalError) -> Self {
        IngestError::Journal(e)
    }
}

impl From<ConfigError> for IngestError {
    fn from(e: ConfigError) -> Self {
        IngestError::Config(e)
    }
}
