use byteorder::{BigEndian, ByteOrder};

use crate::constants::TRAILER_TIMESTAMPS_LEN;
use crate::source::ByteSource;
use crate::trailer::types::{TrailerError, TrailerInfo, TrailerLayout};
use crate::types::IngestError;

/// Read the padded tail of `source` and decode its trailer.
pub fn read_trailer(source: &mut dyn ByteSource, layout: &TrailerLayout) -> Result<TrailerInfo, IngestError> {
    let source_len = source.len()?;
    let trailer_len = layout.trailer_len();
    if source_len < trailer_len as u64 {
        return Err(TrailerError::ShortSource { length: source_len, trailer_len }.into());
    }

    let window_len = (layout.window_len() as u64).min(source_len);
    let window_start = source_len - window_len;
    let window = source.read(window_start, window_len as usize)?;

    Ok(parse_trailer(&window, window_start, source_len, layout)?)
}

/// Decode a trailer from the tail `window` of a source of `source_len`
/// bytes, where `window[0]` sits at `window_start`.
///
/// When several marker positions fit, the latest one wins: data records
/// ending in one-bits would otherwise shift the marker backwards.
pub fn parse_trailer(
    window: &[u8],
    window_start: u64,
    source_len: u64,
    layout: &TrailerLayout,
) -> Result<TrailerInfo, TrailerError> {
    let trailer_len = layout.trailer_len();
    if source_len < trailer_len as u64 {
        return Err(TrailerError::ShortSource { length: source_len, trailer_len });
    }

    let missing = || TrailerError::MissingTrailer { window_start, window_len: window.len() };
    if window.len() < trailer_len {
        return Err(missing());
    }

    let r = layout.record_size;
    let marker_at = (0..=window.len() - trailer_len)
        .rev()
        .find(|&o| window[o..o + r].iter().all(|&b| b == layout.marker_byte))
        .ok_or_else(missing)?;

    let ts = &window[marker_at + r..marker_at + r + TRAILER_TIMESTAMPS_LEN];
    let time_on = BigEndian::read_u32(&ts[0..4]);
    let time_off = BigEndian::read_u32(&ts[4..8]);

    let data_len = window_start + marker_at as u64;
    let extra_bytes = source_len - data_len - trailer_len as u64;
    if data_len % r as u64 != 0 {
        return Err(TrailerError::NonIntegralRecordCount { data_len, record_size: r });
    }

    let record_count = data_len / r as u64;
    let time_increment = if record_count > 0 {
        (time_off as f64 - time_on as f64) / record_count as f64
    } else {
        0.0
    };

    Ok(TrailerInfo {
        time_on,
        time_off,
        record_count,
        time_increment,
        data_len,
        extra_bytes,
        source_len,
    })
}
