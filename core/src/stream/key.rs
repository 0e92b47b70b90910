use std::fmt;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Identifies one independent ingestion stream over one source, e.g.
/// `recovered` vs `telemetered` copies of the same instrument file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode)]
pub struct StreamKey {
    pub stream: String,
    pub source: String,
}

impl StreamKey {
    pub fn new(stream: impl Into<String>, source: impl Into<String>) -> Self {
        Self { stream: stream.into(), source: source.into() }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.stream, self.source)
    }
}
