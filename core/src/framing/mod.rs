//! Boundary detection and buffering for raw instrument bytes.
//!
//! Responsibilities:
//! - Buffer bytes as they arrive, keep incomplete tails
//! - Locate frame boundaries through a pluggable `Sieve`
//! - Drop unclassifiable bytes as noise and count them
//!
//! Non-responsibilities:
//! - Record decoding
//! - Checkpointing
//! - IO

pub mod types;
pub mod sieve;
pub mod framer;

pub use types::{Frame, SieveError, SieveScan};
pub use sieve::{CompositeSieve, DelimitedSieve, FixedLengthSieve, Sieve};
pub use framer::Framer;
