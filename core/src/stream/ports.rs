//! stream/ports.rs
//! Collaborator interfaces injected into the engine, plus in-memory
//! implementations.

use std::collections::HashMap;

use thiserror::Error;

use crate::recovery::{JournalError, ParserState};
use crate::stream::key::StreamKey;
use crate::stream::particle::Particle;
use crate::types::{ErrorKind, IngestError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("state rejected: {0}")]
    Rejected(String),
}

/// Durable checkpoint persistence.
///
/// Called synchronously once per emitted particle, before the particle
/// reaches the sink. Returning an error aborts that emission and leaves
/// the decoder's state untouched.
pub trait StateStore {
    fn on_state_change(
        &mut self,
        key: &StreamKey,
        state: &ParserState,
        record_fully_ingested: bool,
    ) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for &mut S {
    fn on_state_change(&mut self, key: &StreamKey, state: &ParserState, done: bool) -> Result<(), StoreError> {
        (**self).on_state_change(key, state, done)
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn on_state_change(&mut self, key: &StreamKey, state: &ParserState, done: bool) -> Result<(), StoreError> {
        (**self).on_state_change(key, state, done)
    }
}

/// Receives particles in emission order: metadata first, then ascending
/// record index.
pub trait ParticleSink<T> {
    fn accept(&mut self, key: &StreamKey, particle: Particle<T>);
}

impl<T, P: ParticleSink<T> + ?Sized> ParticleSink<T> for &mut P {
    fn accept(&mut self, key: &StreamKey, particle: Particle<T>) {
        (**self).accept(key, particle)
    }
}

impl<T, P: ParticleSink<T> + ?Sized> ParticleSink<T> for Box<P> {
    fn accept(&mut self, key: &StreamKey, particle: Particle<T>) {
        (**self).accept(key, particle)
    }
}

/// Failure report with enough context to mark a source failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub stream_key: StreamKey,
    pub kind: ErrorKind,
    pub offset: Option<u64>,
    pub permanent: bool,
    pub message: String,
}

impl IngestFailure {
    pub fn from_error(key: &StreamKey, error: &IngestError) -> Self {
        Self {
            stream_key: key.clone(),
            kind: error.kind(),
            offset: error.offset(),
            permanent: error.is_permanent(),
            message: error.to_string(),
        }
    }
}

pub trait ExceptionSink {
    fn report(&mut self, failure: IngestFailure);
}

impl<E: ExceptionSink + ?Sized> ExceptionSink for &mut E {
    fn report(&mut self, failure: IngestFailure) {
        (**self).report(failure)
    }
}

impl<E: ExceptionSink + ?Sized> ExceptionSink for Box<E> {
    fn report(&mut self, failure: IngestFailure) {
        (**self).report(failure)
    }
}

// ================= In-memory implementations =================

/// Keeps the latest state per stream and the full change history.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    latest: HashMap<StreamKey, ParserState>,
    pub history: Vec<(StreamKey, ParserState, bool)>,
    /// Reject every change once this many have been accepted.
    fail_after: Option<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(accepted: usize) -> Self {
        Self { fail_after: Some(accepted), ..Self::default() }
    }

    pub fn latest(&self, key: &StreamKey) -> Option<ParserState> {
        self.latest.get(key).copied()
    }

    /// Allow further changes after a simulated failure.
    pub fn heal(&mut self) {
        self.fail_after = None;
    }
}

impl StateStore for MemoryStateStore {
    fn on_state_change(&mut self, key: &StreamKey, state: &ParserState, done: bool) -> Result<(), StoreError> {
        if self.fail_after.is_some_and(|n| self.history.len() >= n) {
            return Err(StoreError::Rejected(format!("store unavailable for {}", key)));
        }
        self.latest.insert(key.clone(), *state);
        self.history.push((key.clone(), *state, done));
        Ok(())
    }
}

#[derive(Debug)]
pub struct VecSink<T> {
    pub particles: Vec<(StreamKey, Particle<T>)>,
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self { particles: Vec::new() }
    }
}

impl<T> VecSink<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_key<'a>(&'a self, key: &'a StreamKey) -> impl Iterator<Item = &'a Particle<T>> + 'a {
        self.particles.iter().filter(move |(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn take(&mut self) -> Vec<Particle<T>> {
        std::mem::take(&mut self.particles).into_iter().map(|(_, p)| p).collect()
    }
}

impl<T> ParticleSink<T> for VecSink<T> {
    fn accept(&mut self, key: &StreamKey, particle: Particle<T>) {
        self.particles.push((key.clone(), particle));
    }
}

#[derive(Debug, Default)]
pub struct RecordingExceptionSink {
    pub failures: Vec<IngestFailure>,
}

impl ExceptionSink for RecordingExceptionSink {
    fn report(&mut self, failure: IngestFailure) {
        self.failures.push(failure);
    }
}
