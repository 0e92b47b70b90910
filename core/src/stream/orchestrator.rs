//! stream/orchestrator.rs
//! One checkpointed decoder per (stream key, source) pair.
//!
//! Streams are isolated: a failure, exhaustion, reset or removal of one key
//! never touches another. The orchestrator does not decide when to pull;
//! an external scheduler does.

use std::collections::HashMap;

use crate::codec::FixedWidthCodec;
use crate::config::{CorruptRecordPolicy, IngestConfig};
use crate::recovery::ParserState;
use crate::source::ByteSource;
use crate::stream::decoder::{CheckpointedDecoder, DecoderPhase, PullSummary};
use crate::stream::key::StreamKey;
use crate::stream::ports::{ExceptionSink, IngestFailure, ParticleSink, StateStore};
use crate::telemetry::TelemetrySnapshot;
use crate::types::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Active(DecoderPhase),
    /// Halted on a corrupt frame at this offset.
    Blocked { offset: u64 },
    /// Permanently failed; only `remove` or `reset` clears it.
    Failed,
}

pub struct StreamOrchestrator<C, S, P, E>
where
    C: FixedWidthCodec + Clone,
{
    codec: C,
    config: IngestConfig,
    decoders: HashMap<StreamKey, CheckpointedDecoder<C>>,
    failed: HashMap<StreamKey, IngestFailure>,
    store: S,
    sink: P,
    exceptions: E,
}

impl<C, S, P, E> StreamOrchestrator<C, S, P, E>
where
    C: FixedWidthCodec + Clone,
    S: StateStore,
    P: ParticleSink<C::Output>,
    E: ExceptionSink,
{
    pub fn new(codec: C, config: IngestConfig, store: S, sink: P, exceptions: E) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self {
            codec,
            config,
            decoders: HashMap::new(),
            failed: HashMap::new(),
            store,
            sink,
            exceptions,
        })
    }

    /// Return the decoder for `key`, creating it from `source` and
    /// `restored` on first sight. For a known key the arguments are
    /// dropped. Construction errors are reported and, being source-wide,
    /// mark the key failed.
    pub fn get_or_create(
        &mut self,
        key: StreamKey,
        source: Box<dyn ByteSource>,
        restored: Option<ParserState>,
    ) -> Result<&mut CheckpointedDecoder<C>, IngestError> {
        if self.failed.contains_key(&key) {
            return Err(IngestError::StreamFailed(key.to_string()));
        }

        if !self.decoders.contains_key(&key) {
            match CheckpointedDecoder::with_config(key.clone(), source, self.codec.clone(), restored, &self.config) {
                Ok(decoder) => {
                    self.decoders.insert(key.clone(), decoder);
                }
                Err(e) => {
                    self.report(&key, &e);
                    return Err(e);
                }
            }
        }

        self.decoders
            .get_mut(&key)
            .ok_or_else(|| IngestError::UnknownStream(key.to_string()))
    }

    /// Pull up to `max_records` particles from one stream.
    ///
    /// Under `CorruptRecordPolicy::Skip` a corrupt frame is reported,
    /// stepped over, and pulling continues within the same budget.
    pub fn pull(&mut self, key: &StreamKey, max_records: usize) -> Result<PullSummary, IngestError> {
        if self.failed.contains_key(key) {
            return Err(IngestError::StreamFailed(key.to_string()));
        }
        let policy = self.config.corrupt_record_policy;
        let decoder = self
            .decoders
            .get_mut(key)
            .ok_or_else(|| IngestError::UnknownStream(key.to_string()))?;

        let mut total: Option<PullSummary> = None;
        let mut remaining = max_records;

        loop {
            let before = decoder.state();
            match decoder.pull(remaining, &mut self.store, &mut self.sink) {
                Ok(summary) => return Ok(merge(total, summary)),
                Err(e) => {
                    self.exceptions.report(IngestFailure::from_error(key, &e));

                    let skippable = matches!(e, IngestError::CorruptRecord { .. })
                        && policy == CorruptRecordPolicy::Skip;
                    if !skippable {
                        return Err(e);
                    }

                    let after = decoder.state();
                    let emitted = emitted_between(&before, &after);
                    total = Some(merge(total, partial_summary(&before, &after, decoder.phase())));
                    remaining = remaining.saturating_sub(emitted);

                    decoder.skip_frame(&mut self.store)?;
                    if remaining == 0 {
                        let mut summary = merge(total, partial_summary(&after, &after, decoder.phase()));
                        summary.state = decoder.state();
                        return Ok(summary);
                    }
                }
            }
        }
    }

    pub fn pull_default(&mut self, key: &StreamKey) -> Result<PullSummary, IngestError> {
        self.pull(key, self.config.default_pull_budget)
    }

    /// Pull every active, non-exhausted stream once, in key order.
    pub fn pull_all(&mut self, max_records: usize) -> Vec<(StreamKey, Result<PullSummary, IngestError>)> {
        let mut keys: Vec<StreamKey> = self
            .decoders
            .iter()
            .filter(|(_, d)| !d.is_exhausted())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();

        keys.into_iter()
            .map(|key| {
                let result = self.pull(&key, max_records);
                (key, result)
            })
            .collect()
    }

    /// Forget a stream (its source disappeared). Clears a failed mark.
    pub fn remove(&mut self, key: &StreamKey) -> bool {
        let had_decoder = self.decoders.remove(key).is_some();
        let had_failure = self.failed.remove(key).is_some();
        had_decoder || had_failure
    }

    /// Replace a stream's decoder, e.g. after the source was rewritten.
    pub fn reset(
        &mut self,
        key: StreamKey,
        source: Box<dyn ByteSource>,
        restored: Option<ParserState>,
    ) -> Result<&mut CheckpointedDecoder<C>, IngestError> {
        self.remove(&key);
        self.get_or_create(key, source, restored)
    }

    pub fn status(&self, key: &StreamKey) -> Option<StreamStatus> {
        if self.failed.contains_key(key) {
            return Some(StreamStatus::Failed);
        }
        self.decoders.get(key).map(|d| match d.blocked_at() {
            Some(offset) => StreamStatus::Blocked { offset },
            None => StreamStatus::Active(d.phase()),
        })
    }

    pub fn keys(&self) -> Vec<StreamKey> {
        let mut keys: Vec<StreamKey> = self.decoders.keys().chain(self.failed.keys()).cloned().collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn decoder(&self, key: &StreamKey) -> Option<&CheckpointedDecoder<C>> {
        self.decoders.get(key)
    }

    pub fn failure(&self, key: &StreamKey) -> Option<&IngestFailure> {
        self.failed.get(key)
    }

    pub fn telemetry(&self, key: &StreamKey) -> Option<TelemetrySnapshot> {
        self.decoders.get(key).map(|d| d.telemetry())
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    pub fn exceptions(&self) -> &E {
        &self.exceptions
    }

    fn report(&mut self, key: &StreamKey, error: &IngestError) {
        let failure = IngestFailure::from_error(key, error);
        if failure.permanent {
            self.decoders.remove(key);
            self.failed.insert(key.clone(), failure.clone());
        }
        self.exceptions.report(failure);
    }
}

fn emitted_between(before: &ParserState, after: &ParserState) -> usize {
    let metadata = usize::from(after.metadata_sent && !before.metadata_sent);
    metadata + (after.records_read - before.records_read) as usize
}

fn partial_summary(before: &ParserState, after: &ParserState, phase: DecoderPhase) -> PullSummary {
    let metadata = after.metadata_sent && !before.metadata_sent;
    let samples = (after.records_read - before.records_read) as usize;
    PullSummary {
        emitted: samples + usize::from(metadata),
        metadata,
        samples,
        phase,
        state: *after,
        stopped_early: false,
    }
}

fn merge(total: Option<PullSummary>, next: PullSummary) -> PullSummary {
    match total {
        None => next,
        Some(t) => PullSummary {
            emitted: t.emitted + next.emitted,
            metadata: t.metadata || next.metadata,
            samples: t.samples + next.samples,
            phase: next.phase,
            state: next.state,
            stopped_early: t.stopped_early || next.stopped_early,
        },
    }
}
