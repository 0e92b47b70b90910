use byteorder::{BigEndian, WriteBytesExt};

use crate::trailer::types::TrailerLayout;

/// Encode a trailer into canonical wire format.
///
/// Layout:
///
/// ```text
/// [ marker (R) ]
/// [ time_on  (4, BE) ]
/// [ time_off (4, BE) ]
/// [ pad (0..=layout.pad) ]
/// ```
pub fn encode_trailer(layout: &TrailerLayout, time_on: u32, time_off: u32, pad: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(layout.trailer_len() + pad);
    out.extend(std::iter::repeat(layout.marker_byte).take(layout.record_size));
    // writes into a Vec cannot fail
    let _ = out.write_u32::<BigEndian>(time_on);
    let _ = out.write_u32::<BigEndian>(time_off);
    out.resize(out.len() + pad, 0);
    out
}

/// Concatenate data records and a trailer into a complete source image.
pub fn encode_source(
    layout: &TrailerLayout,
    records: &[Vec<u8>],
    time_on: u32,
    time_off: u32,
    pad: usize,
) -> Vec<u8> {
    let mut out: Vec<u8> = records.iter().flatten().copied().collect();
    out.extend_from_slice(&encode_trailer(layout, time_on, time_off, pad));
    out
}
