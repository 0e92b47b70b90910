//! recovery/resume.rs
//! Journal line format.
//!
//! ```text
//! STATE: <base64(bincode(JournalEntry))>|<blake3(base64)[..8]>
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use bincode::{Decode, Encode};
use thiserror::Error;

use crate::constants::{JOURNAL_CHECKSUM_LEN, JOURNAL_STATE_PREFIX};
use crate::recovery::checkpoint::ParserState;
use crate::stream::StreamKey;

/// One persisted state change.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct JournalEntry {
    pub key: StreamKey,
    pub state: ParserState,
    pub ingested: bool,
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal encode: {0}")]
    Encode(String),

    #[error("corrupt journal line: {0}")]
    Corrupt(String),
}

fn checksum(payload: &str) -> String {
    let hash = blake3::hash(payload.as_bytes());
    hash.to_hex()[..JOURNAL_CHECKSUM_LEN].to_string()
}

pub fn format_state_line(entry: &JournalEntry) -> Result<String, JournalError> {
    let raw = bincode::encode_to_vec(entry, bincode::config::standard())
        .map_err(|e| JournalError::Encode(e.to_string()))?;
    let payload = STANDARD.encode(raw);
    let sum = checksum(&payload);
    Ok(format!("{}{}|{}", JOURNAL_STATE_PREFIX, payload, sum))
}

/// `Ok(None)` for lines that are not state entries.
pub fn parse_state_line(line: &str) -> Result<Option<JournalEntry>, JournalError> {
    let Some(content) = line.strip_prefix(JOURNAL_STATE_PREFIX) else {
        return Ok(None);
    };

    let (payload, provided) = content
        .rsplit_once('|')
        .ok_or_else(|| JournalError::Corrupt("missing checksum".into()))?;
    if checksum(payload) != provided {
        return Err(JournalError::Corrupt("checksum mismatch".into()));
    }

    let raw = STANDARD
        .decode(payload)
        .map_err(|e| JournalError::Corrupt(e.to_string()))?;
    let (entry, _) = bincode::decode_from_slice::<JournalEntry, _>(&raw, bincode::config::standard())
        .map_err(|e| JournalError::Corrupt(e.to_string()))?;
    Ok(Some(entry))
}
