use serde::{Deserialize, Serialize};

use crate::codec::Metadata;

/// A decoded, timestamped unit of output.
///
/// Timestamps are seconds (fractional for interpolated samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Particle<T> {
    Metadata {
        timestamp: f64,
        metadata: Metadata,
    },
    Sample {
        index: u64,
        timestamp: f64,
        value: T,
    },
}

impl<T> Particle<T> {
    pub fn timestamp(&self) -> f64 {
        match self {
            Particle::Metadata { timestamp, .. } | Particle::Sample { timestamp, .. } => *timestamp,
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, Particle::Metadata { .. })
    }

    /// Record index for samples.
    pub fn index(&self) -> Option<u64> {
        match self {
            Particle::Sample { index, .. } => Some(*index),
            Particle::Metadata { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Particle::Sample { value, .. } => Some(value),
            Particle::Metadata { .. } => None,
        }
    }
}
