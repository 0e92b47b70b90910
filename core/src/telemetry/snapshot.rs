//! telemetry/snapshot.rs
//! Immutable, serializable view of one stream's telemetry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::IngestCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: IngestCounters,
    /// Share of read bytes dropped as noise.
    pub noise_ratio: f64,
    pub throughput_particles_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &IngestCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();

        let noise_ratio = if counters.bytes_read > 0 {
            (counters.noise_bytes as f64 / counters.bytes_read as f64).min(1.0)
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.particles() as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            noise_ratio,
            throughput_particles_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Internal invariants: consumed never exceeds read, and stage time
    /// never exceeds wall time.
    pub fn sanity_check(&self) -> bool {
        self.counters.bytes_consumed <= self.counters.bytes_read
            && self.noise_ratio <= 1.0
            && self.stage_times.total() <= self.elapsed
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
