//! telemetry/counters.rs
//! Mutable counters updated by a decoder as it emits particles.
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Deterministic counters collected during ingestion
#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestCounters {
    pub frames_located: u64,
    pub particles_metadata: u64,
    pub particles_sample: u64,
    pub frames_corrupt: u64,
    pub frames_skipped: u64,
    pub bytes_read: u64,
    /// Bytes checkpointed as consumed (emitted or skipped frames).
    pub bytes_consumed: u64,
    /// Bytes the framer dropped because no sieve matched them.
    pub noise_bytes: u64,
}

impl IngestCounters {
    pub fn add_read(&mut self, len: usize) {
        self.bytes_read += len as u64;
    }

    pub fn add_frames(&mut self, count: usize) {
        self.frames_located += count as u64;
    }

    pub fn add_metadata(&mut self) {
        self.particles_metadata += 1;
    }

    pub fn add_sample(&mut self, frame_len: u64) {
        self.particles_sample += 1;
        self.bytes_consumed += frame_len;
    }

    pub fn add_corrupt(&mut self) {
        self.frames_corrupt += 1;
    }

    pub fn add_skipped(&mut self, frame_len: u64) {
        self.frames_skipped += 1;
        self.bytes_consumed += frame_len;
    }

    pub fn add_noise(&mut self, len: u64) {
        self.noise_bytes += len;
    }

    pub fn particles(&self) -> u64 {
        self.particles_metadata + self.particles_sample
    }

    pub fn merge(&mut self, other: &IngestCounters) {
        self.frames_located += other.frames_located;
        self.particles_metadata += other.particles_metadata;
        self.particles_sample += other.particles_sample;
        self.frames_corrupt += other.frames_corrupt;
        self.frames_skipped += other.frames_skipped;
        self.bytes_read += other.bytes_read;
        self.bytes_consumed += other.bytes_consumed;
        self.noise_bytes += other.noise_bytes;
    }
}

impl AddAssign for IngestCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
