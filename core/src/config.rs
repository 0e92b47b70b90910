//! config.rs
//! Engine configuration with serde defaults and a JSON loader.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_JOURNAL_ROTATION_LIMIT, DEFAULT_PULL_BUDGET, DEFAULT_READ_CHUNK_SIZE,
    DEFAULT_TRAILER_PAD, MAX_READ_CHUNK_SIZE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be > 0")]
    Zero { field: &'static str },
    #[error("read_chunk_size {have} exceeds max {max}")]
    ChunkTooLarge { have: usize, max: usize },
}

/// What the orchestrator does when a frame fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptRecordPolicy {
    /// Report and stop; the frame stays at the head of the stream.
    #[default]
    Halt,
    /// Report, step over the frame and keep pulling.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Bytes requested from the source per read.
    pub read_chunk_size: usize,

    /// Extra bytes tolerated after the trailer timestamps.
    pub trailer_pad: usize,

    /// Budget used by `pull_default`.
    pub default_pull_budget: usize,

    pub corrupt_record_policy: CorruptRecordPolicy,

    /// Journal appends before rotation.
    pub journal_rotation_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            trailer_pad: DEFAULT_TRAILER_PAD,
            default_pull_budget: DEFAULT_PULL_BUDGET,
            corrupt_record_policy: CorruptRecordPolicy::Halt,
            journal_rotation_limit: DEFAULT_JOURNAL_ROTATION_LIMIT,
        }
    }
}

impl IngestConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: IngestConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_policy(mut self, policy: CorruptRecordPolicy) -> Self {
        self.corrupt_record_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_chunk_size == 0 {
            return Err(ConfigError::Zero { field: "read_chunk_size" });
        }
        if self.read_chunk_size > MAX_READ_CHUNK_SIZE {
            return Err(ConfigError::ChunkTooLarge {
                have: self.read_chunk_size,
                max: MAX_READ_CHUNK_SIZE,
            });
        }
        if self.default_pull_budget == 0 {
            return Err(ConfigError::Zero { field: "default_pull_budget" });
        }
        if self.journal_rotation_limit == 0 {
            return Err(ConfigError::Zero { field: "journal_rotation_limit" });
        }
        Ok(())
    }
}
