//! codec/ctd.rs
//! WFP C-file CTD record (11 bytes, big-endian).
//!
//! ```text
//! [ conductivity (3) ][ temperature (3) ][ pressure (3) ][ oxygen (2) ]
//! ```

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::codec::types::{CodecError, FixedWidthCodec, RecordCodec};
use crate::constants::{EOP_MARKER, WFP_RECORD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtdSample {
    pub conductivity: u32,
    pub temperature: u32,
    pub pressure: u32,
    pub oxygen: u16,
}

impl CtdSample {
    /// Canonical 11-byte encoding; fields wider than their slot are truncated.
    pub fn to_bytes(&self) -> [u8; WFP_RECORD_SIZE] {
        let mut out = [0u8; WFP_RECORD_SIZE];
        BigEndian::write_u24(&mut out[0..3], self.conductivity & 0x00FF_FFFF);
        BigEndian::write_u24(&mut out[3..6], self.temperature & 0x00FF_FFFF);
        BigEndian::write_u24(&mut out[6..9], self.pressure & 0x00FF_FFFF);
        BigEndian::write_u16(&mut out[9..11], self.oxygen);
        out
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WfpCtdCodec;

impl RecordCodec for WfpCtdCodec {
    type Output = CtdSample;
    type State = ();

    fn decode(&self, frame: &[u8], _state: &mut ()) -> Result<CtdSample, CodecError> {
        if frame.len() != WFP_RECORD_SIZE {
            return Err(CodecError::LengthMismatch { expected: WFP_RECORD_SIZE, actual: frame.len() });
        }
        if frame == EOP_MARKER {
            return Err(CodecError::EndMarker);
        }

        Ok(CtdSample {
            conductivity: BigEndian::read_u24(&frame[0..3]),
            temperature: BigEndian::read_u24(&frame[3..6]),
            pressure: BigEndian::read_u24(&frame[6..9]),
            oxygen: BigEndian::read_u16(&frame[9..11]),
        })
    }
}

impl FixedWidthCodec for WfpCtdCodec {
    fn record_size(&self) -> usize {
        WFP_RECORD_SIZE
    }
}
