//! framing/sieve.rs
//! Per-format boundary rules.
//!
//! A sieve never fails: data it cannot classify simply does not match.

use std::ops::Range;

use bytes::Bytes;

use crate::framing::types::{SieveError, SieveScan};

/// Boundary-detection capability implemented once per wire format.
pub trait Sieve: Send {
    fn scan(&self, buf: &[u8]) -> SieveScan;
}

impl<S: Sieve + ?Sized> Sieve for Box<S> {
    fn scan(&self, buf: &[u8]) -> SieveScan {
        (**self).scan(buf)
    }
}

#[inline]
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

// Start of the longest suffix of `buf` that could still grow into `needle`.
#[inline]
fn partial_suffix_start(buf: &[u8], needle: &[u8], from: usize) -> usize {
    let keep = needle.len().saturating_sub(1).min(buf.len().saturating_sub(from));
    for k in (1..=keep).rev() {
        let start = buf.len() - k;
        if needle.starts_with(&buf[start..]) {
            return start;
        }
    }
    buf.len()
}

// ================= Fixed length =================

/// Fixed-width binary records, optionally aligned on a sync pattern and
/// optionally stopped by an end-marker record.
#[derive(Debug, Clone)]
pub struct FixedLengthSieve {
    record_size: usize,
    sync: Option<Bytes>,
    end_marker: Option<Bytes>,
}

impl FixedLengthSieve {
    pub fn new(record_size: usize) -> Self {
        assert!(record_size > 0, "record size must be non-zero");
        Self { record_size, sync: None, end_marker: None }
    }

    /// Records must begin with `pattern`; bytes before it are noise.
    pub fn with_sync(mut self, pattern: impl Into<Bytes>) -> Self {
        self.sync = Some(pattern.into()).filter(|p| !p.is_empty());
        self
    }

    /// Stop framing when `marker` is found at a record boundary.
    pub fn with_end_marker(mut self, marker: impl Into<Bytes>) -> Self {
        self.end_marker = Some(marker.into()).filter(|m| !m.is_empty());
        self
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }
}

impl Sieve for FixedLengthSieve {
    fn scan(&self, buf: &[u8]) -> SieveScan {
        let mut scan = SieveScan::empty();
        let mut i = 0usize;

        loop {
            if let Some(marker) = &self.end_marker {
                if buf.len() >= i + marker.len() && &buf[i..i + marker.len()] == marker.as_ref() {
                    scan.terminator = Some(i);
                    scan.noise_until = i;
                    break;
                }
            }

            if let Some(sync) = &self.sync {
                match find(buf, sync, i) {
                    Some(p) => i = p,
                    None => {
                        scan.noise_until = partial_suffix_start(buf, sync, i).max(i);
                        break;
                    }
                }
            }

            if i + self.record_size > buf.len() {
                scan.noise_until = i;
                break;
            }

            scan.ranges.push(i..i + self.record_size);
            i += self.record_size;
        }

        scan
    }
}

// ================= Delimited =================

/// Variable-length blocks between a start pattern and a terminator,
/// e.g. ASCII status blocks interleaved with binary data.
#[derive(Debug, Clone)]
pub struct DelimitedSieve {
    start: Bytes,
    end: Bytes,
    max_frame_len: usize,
}

impl DelimitedSieve {
    pub fn new(start: impl Into<Bytes>, end: impl Into<Bytes>) -> Result<Self, SieveError> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() {
            return Err(SieveError::EmptyPattern("start"));
        }
        if end.is_empty() {
            return Err(SieveError::EmptyPattern("end"));
        }
        Ok(Self { start, end, max_frame_len: usize::MAX })
    }

    /// A start pattern with no terminator within `len` bytes is noise.
    pub fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len.max(self.start.len() + self.end.len());
        self
    }
}

impl Sieve for DelimitedSieve {
    fn scan(&self, buf: &[u8]) -> SieveScan {
        let mut scan = SieveScan::empty();
        let mut i = 0usize;

        loop {
            let Some(s) = find(buf, &self.start, i) else {
                scan.noise_until = partial_suffix_start(buf, &self.start, i).max(i);
                break;
            };

            match find(buf, &self.end, s + self.start.len()) {
                Some(e) if e + self.end.len() - s <= self.max_frame_len => {
                    let end = e + self.end.len();
                    scan.ranges.push(s..end);
                    i = end;
                }
                Some(_) => {
                    // oversized: not a frame, resume just past this start
                    i = s + 1;
                }
                None if buf.len() - s > self.max_frame_len => {
                    i = s + 1;
                }
                None => {
                    scan.noise_until = s;
                    break;
                }
            }
        }

        scan
    }
}

// ================= Composite =================

/// Tries each member in priority order and merges the results.
///
/// A lower-priority range overlapping an accepted higher-priority range is
/// dropped, as is one reaching past a higher-priority candidate that is
/// still incomplete. The earliest terminator of any member wins.
pub struct CompositeSieve {
    members: Vec<Box<dyn Sieve>>,
}

impl CompositeSieve {
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    /// Append a member with lower priority than those already present.
    pub fn push(mut self, sieve: impl Sieve + 'static) -> Self {
        self.members.push(Box::new(sieve));
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for CompositeSieve {
    fn default() -> Self {
        Self::new()
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

impl Sieve for CompositeSieve {
    fn scan(&self, buf: &[u8]) -> SieveScan {
        if self.members.is_empty() {
            return SieveScan::empty();
        }

        let mut accepted: Vec<Range<usize>> = Vec::new();
        let mut terminator: Option<usize> = None;
        let mut noise_until = usize::MAX;
        // earliest start of an incomplete candidate held by a higher-priority member
        let mut pending = buf.len();

        for member in &self.members {
            let scan = member.scan(buf);
            terminator = match (terminator, scan.terminator) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            noise_until = noise_until.min(scan.noise_until);

            for range in scan.ranges {
                if range.end <= pending && !accepted.iter().any(|a| overlaps(a, &range)) {
                    accepted.push(range);
                }
            }

            if scan.terminator.is_none() {
                pending = pending.min(scan.noise_until);
            }
        }

        if let Some(t) = terminator {
            accepted.retain(|r| r.end <= t);
            noise_until = noise_until.min(t);
        }
        accepted.sort_by_key(|r| r.start);

        // a member's noise may be another member's frame
        if let Some(first) = accepted.first() {
            noise_until = noise_until.min(first.start);
        }

        SieveScan { ranges: accepted, terminator, noise_until }
    }
}
