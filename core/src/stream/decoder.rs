//! stream/decoder.rs
//! Resumable decode loop over one bounded source.
//!
//! Composes the trailer reader, a fixed-length framer and a record codec.
//! State changes only at a fully-emitted-particle boundary, and every
//! change reaches the `StateStore` before its particle reaches the sink.

use std::collections::VecDeque;
use std::ops::Range;

use crate::codec::{FixedWidthCodec, Metadata, RecordCodec};
use crate::config::{ConfigError, IngestConfig};
use crate::framing::{FixedLengthSieve, Frame, Framer};
use crate::recovery::ParserState;
use crate::source::ByteSource;
use crate::stream::key::StreamKey;
use crate::stream::particle::Particle;
use crate::stream::ports::{ParticleSink, StateStore};
use crate::telemetry::{IngestCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::trailer::{read_trailer, TrailerInfo, TrailerLayout};
use crate::types::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    AwaitingMetadata,
    StreamingRecords,
    Exhausted,
}

/// What one `pull` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullSummary {
    /// Particles handed to the sink (metadata included).
    pub emitted: usize,
    pub metadata: bool,
    pub samples: usize,
    pub phase: DecoderPhase,
    pub state: ParserState,
    /// The end-of-profile marker arrived before the trailer's record count
    /// was reached.
    pub stopped_early: bool,
}

impl PullSummary {
    pub fn is_exhausted(&self) -> bool {
        self.phase == DecoderPhase::Exhausted
    }
}

pub struct CheckpointedDecoder<C: FixedWidthCodec> {
    key: StreamKey,
    source: Box<dyn ByteSource>,
    codec: C,
    codec_state: C::State,
    layout: TrailerLayout,
    trailer: TrailerInfo,
    framer: Framer<FixedLengthSieve>,
    /// Frames located but not yet emitted; never checkpointed.
    pending: VecDeque<Frame>,
    read_cursor: u64,
    /// Data region plus the end-of-profile marker.
    read_limit: u64,
    read_chunk_size: usize,
    state: ParserState,
    phase: DecoderPhase,
    held_metadata: Option<Metadata>,
    /// Byte range of the frame that last failed to decode.
    blocked: Option<Range<u64>>,
    stopped_early: bool,
    counters: IngestCounters,
    timer: TelemetryTimer,
}

impl<C: FixedWidthCodec> CheckpointedDecoder<C> {
    pub fn new(
        key: StreamKey,
        source: Box<dyn ByteSource>,
        codec: C,
        restored: Option<ParserState>,
    ) -> Result<Self, IngestError> {
        Self::with_config(key, source, codec, restored, &IngestConfig::default())
    }

    /// Read the trailer, validate `restored` against it and seek the source
    /// to the checkpointed position. Nothing is emitted here.
    pub fn with_config(
        key: StreamKey,
        mut source: Box<dyn ByteSource>,
        codec: C,
        restored: Option<ParserState>,
        config: &IngestConfig,
    ) -> Result<Self, IngestError> {
        config.validate()?;

        let record_size = codec.record_size();
        if record_size == 0 {
            return Err(ConfigError::Zero { field: "record_size" }.into());
        }

        let mut timer = TelemetryTimer::new();
        let layout = TrailerLayout::new(record_size, config.trailer_pad);
        let trailer = timer.time(Stage::Trailer, || read_trailer(source.as_mut(), &layout))?;

        let state = restored.unwrap_or_default();
        state.validate(&trailer, record_size)?;
        source.seek(state.position)?;

        let held_metadata = (!state.metadata_sent).then(|| metadata_of(&trailer));

        let mut decoder = Self {
            key,
            source,
            codec,
            codec_state: C::State::default(),
            layout,
            trailer,
            framer: new_framer(&layout, state.position),
            pending: VecDeque::new(),
            read_cursor: state.position,
            read_limit: trailer.data_len + record_size as u64,
            read_chunk_size: config.read_chunk_size,
            state,
            phase: DecoderPhase::AwaitingMetadata,
            held_metadata,
            blocked: None,
            stopped_early: false,
            counters: IngestCounters::default(),
            timer,
        };
        decoder.phase = decoder.derive_phase();
        Ok(decoder)
    }

    /// Emit up to `max_records` particles.
    ///
    /// The held metadata particle counts toward the budget. On
    /// `CorruptRecord` the particles already emitted by this call stay
    /// emitted and checkpointed; the failing frame is left unconsumed.
    pub fn pull(
        &mut self,
        max_records: usize,
        store: &mut dyn StateStore,
        sink: &mut dyn ParticleSink<C::Output>,
    ) -> Result<PullSummary, IngestError> {
        let mut summary = PullSummary {
            emitted: 0,
            metadata: false,
            samples: 0,
            phase: self.phase,
            state: self.state,
            stopped_early: false,
        };

        while summary.emitted < max_records {
            match self.phase {
                DecoderPhase::Exhausted => break,
                DecoderPhase::AwaitingMetadata => {
                    self.emit_metadata(store, sink)?;
                    summary.metadata = true;
                }
                DecoderPhase::StreamingRecords => {
                    if !self.fill_pending()? {
                        if self.framer.is_terminated() {
                            self.stopped_early = true;
                            self.phase = self.derive_phase();
                        }
                        // otherwise a growing source: nothing more yet
                        break;
                    }
                    self.emit_next_sample(store, sink)?;
                    summary.samples += 1;
                }
            }
            summary.emitted += 1;
            self.phase = self.derive_phase();
        }

        summary.phase = self.phase;
        summary.state = self.state;
        summary.stopped_early = self.stopped_early;
        Ok(summary)
    }

    /// Step over the frame that last failed with `CorruptRecord`.
    ///
    /// The skip is checkpointed (`records_skipped`) without emitting a
    /// particle. Returns the skipped byte range, or `None` when nothing is
    /// blocked.
    pub fn skip_frame(&mut self, store: &mut dyn StateStore) -> Result<Option<Range<u64>>, IngestError> {
        let Some(range) = self.blocked.clone() else {
            return Ok(None);
        };
        let len = range.end - range.start;

        let next = self.state.after_skip(len);
        let done = next.is_complete(&self.trailer);
        store.on_state_change(&self.key, &next, done)?;
        self.state = next;
        self.blocked = None;
        self.counters.add_skipped(len);

        if self.pending.front().is_some_and(|f| f.start == range.start) {
            self.pending.pop_front();
        }

        self.phase = self.derive_phase();
        Ok(Some(range))
    }

    fn derive_phase(&self) -> DecoderPhase {
        if !self.state.metadata_sent {
            DecoderPhase::AwaitingMetadata
        } else if self.stopped_early || self.state.record_index() >= self.trailer.record_count {
            DecoderPhase::Exhausted
        } else {
            DecoderPhase::StreamingRecords
        }
    }

    fn emit_metadata(
        &mut self,
        store: &mut dyn StateStore,
        sink: &mut dyn ParticleSink<C::Output>,
    ) -> Result<(), IngestError> {
        let metadata = self.held_metadata.unwrap_or_else(|| metadata_of(&self.trailer));
        let particle = Particle::Metadata {
            timestamp: self.trailer.time_on as f64,
            metadata,
        };
        self.commit(store, sink, self.state.with_metadata_sent(), particle)?;
        self.held_metadata = None;
        self.counters.add_metadata();
        Ok(())
    }

    fn emit_next_sample(
        &mut self,
        store: &mut dyn StateStore,
        sink: &mut dyn ParticleSink<C::Output>,
    ) -> Result<(), IngestError> {
        let Some(frame) = self.pending.front() else {
            return Ok(());
        };
        let (start, len) = (frame.start, frame.len());
        let index = self.state.record_index();

        let codec = &self.codec;
        let mut scratch = self.codec_state.clone();
        let decoded = self.timer.time(Stage::Decode, || <C as RecordCodec>::decode(codec, frame.as_slice(), &mut scratch));

        let value = match decoded {
            Ok(v) => v,
            Err(source) => {
                self.counters.add_corrupt();
                self.blocked = Some(start..start + len);
                return Err(IngestError::CorruptRecord { offset: start, record_index: index, source });
            }
        };

        let particle = Particle::Sample {
            index,
            timestamp: self.trailer.timestamp_for(index),
            value,
        };
        self.commit(store, sink, self.state.after_sample(len), particle)?;

        self.codec_state = scratch;
        self.pending.pop_front();
        self.blocked = None;
        self.counters.add_sample(len);
        Ok(())
    }

    fn commit(
        &mut self,
        store: &mut dyn StateStore,
        sink: &mut dyn ParticleSink<C::Output>,
        next: ParserState,
        particle: Particle<C::Output>,
    ) -> Result<(), IngestError> {
        let done = next.is_complete(&self.trailer);
        let key = &self.key;
        self.timer.time(Stage::Commit, || store.on_state_change(key, &next, done))?;
        self.state = next;
        sink.accept(&self.key, particle);
        Ok(())
    }

    // Make sure at least one frame is pending. `false` when the data region
    // is used up, the framer hit the marker, or the source has no more
    // bytes yet.
    fn fill_pending(&mut self) -> Result<bool, IngestError> {
        while self.pending.is_empty() {
            if self.framer.is_terminated() || self.read_cursor >= self.read_limit {
                return Ok(false);
            }

            let want = (self.read_limit - self.read_cursor).min(self.read_chunk_size as u64) as usize;
            let source = &mut self.source;
            let cursor = self.read_cursor;
            let chunk = self.timer.time(Stage::Read, || source.read(cursor, want))?;
            if chunk.is_empty() {
                return Ok(false);
            }
            self.read_cursor += chunk.len() as u64;
            self.counters.add_read(chunk.len());

            let noise_before = self.framer.noise_bytes();
            let framer = &mut self.framer;
            framer.feed(&chunk);
            let frames = self.timer.time(Stage::Frame, || framer.drain());
            self.counters.add_frames(frames.len());
            self.counters.add_noise(self.framer.noise_bytes() - noise_before);
            self.pending.extend(frames);
        }
        Ok(true)
    }

    // ================= Accessors =================

    pub fn key(&self) -> &StreamKey {
        &self.key
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == DecoderPhase::Exhausted
    }

    pub fn trailer(&self) -> &TrailerInfo {
        &self.trailer
    }

    pub fn layout(&self) -> &TrailerLayout {
        &self.layout
    }

    pub fn metadata(&self) -> Metadata {
        metadata_of(&self.trailer)
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Whether the marker ended the data region before the trailer's
    /// record count was reached.
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// Offset of the frame blocked by the last `CorruptRecord`, if any.
    pub fn blocked_at(&self) -> Option<u64> {
        self.blocked.as_ref().map(|r| r.start)
    }

    pub fn counters(&self) -> &IngestCounters {
        &self.counters
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }
}

fn metadata_of(trailer: &TrailerInfo) -> Metadata {
    Metadata {
        time_on: trailer.time_on,
        time_off: trailer.time_off,
        record_count: trailer.record_count,
    }
}

fn new_framer(layout: &TrailerLayout, offset: u64) -> Framer<FixedLengthSieve> {
    let sieve = FixedLengthSieve::new(layout.record_size).with_end_marker(layout.marker());
    Framer::with_base_offset(sieve, offset)
}
