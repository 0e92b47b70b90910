//! framing/framer.rs
//! Owns buffering and removal; boundary rules come from the sieve.

use bytes::BytesMut;

use crate::framing::sieve::Sieve;
use crate::framing::types::Frame;

pub struct Framer<S: Sieve> {
    sieve: S,
    buffer: BytesMut,
    /// Absolute stream offset of `buffer[0]`.
    base_offset: u64,
    noise_bytes: u64,
    terminated: bool,
}

impl<S: Sieve> Framer<S> {
    pub fn new(sieve: S) -> Self {
        Self::with_base_offset(sieve, 0)
    }

    /// Start a framer whose first buffered byte sits at `offset` in the
    /// logical stream (used when resuming mid-source).
    pub fn with_base_offset(sieve: S, offset: u64) -> Self {
        Self {
            sieve,
            buffer: BytesMut::new(),
            base_offset: offset,
            noise_bytes: 0,
            terminated: false,
        }
    }

    /// Append raw bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Every frame located since the last drain, in arrival order.
    ///
    /// Frame bytes and any noise before them leave the buffer; an
    /// incomplete tail stays for the next `feed`. Once the sieve reports a
    /// stop-marker the framer yields nothing further.
    pub fn drain(&mut self) -> Vec<Frame> {
        if self.terminated || self.buffer.is_empty() {
            return Vec::new();
        }

        let scan = self.sieve.scan(&self.buffer);
        let limit = scan.terminator.unwrap_or(self.buffer.len()).min(self.buffer.len());

        let mut kept = Vec::with_capacity(scan.ranges.len());
        let mut cursor = 0usize;
        let mut gaps = 0usize;
        for range in scan.ranges {
            // defensive against misbehaving sieves
            if range.start < cursor || range.end > limit || range.start >= range.end {
                continue;
            }
            gaps += range.start - cursor;
            cursor = range.end;
            kept.push(range);
        }

        if scan.terminator.is_some() {
            self.terminated = true;
        }

        let noise_tail = scan.noise_until.min(limit).saturating_sub(cursor);
        let cut = cursor + noise_tail;
        self.noise_bytes += (gaps + noise_tail) as u64;

        if cut == 0 {
            return Vec::new();
        }

        let head = self.buffer.split_to(cut).freeze();
        let base = self.base_offset;
        self.base_offset += cut as u64;

        kept.into_iter()
            .map(|r| Frame {
                start: base + r.start as u64,
                end: base + r.end as u64,
                bytes: head.slice(r),
            })
            .collect()
    }

    /// Drop `n` buffered bytes the caller knows to be permanently
    /// unparseable. Counted as noise.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.buffer.len());
        let _ = self.buffer.split_to(n);
        self.base_offset += n as u64;
        self.noise_bytes += n as u64;
        n
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Bytes buffered but not yet framed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Absolute offset of the next unframed byte.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Absolute offset just past the last fed byte.
    pub fn fed_offset(&self) -> u64 {
        self.base_offset + self.buffer.len() as u64
    }

    pub fn noise_bytes(&self) -> u64 {
        self.noise_bytes
    }

    pub fn sieve(&self) -> &S {
        &self.sieve
    }
}
