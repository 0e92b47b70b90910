// ## 📦 `src/recovery/bootstrap.rs`
// Purpose: Stream-based replay of the checkpoint journal.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::recovery::checkpoint::ParserState;
use crate::recovery::persist::compact_entries;
use crate::recovery::resume::{parse_state_line, JournalEntry, JournalError};
use crate::stream::StreamKey;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub lines_read: usize,
    pub entries: usize,
    pub corrupt_lines: usize,
    pub streams: usize,
}

/// Stream the journal and return the latest entry per stream, in order of
/// last write. A missing journal is an empty one.
pub fn load_checkpoints(path: impl AsRef<Path>) -> Result<(Vec<JournalEntry>, RecoveryReport), JournalError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), RecoveryReport::default())),
        Err(e) => return Err(e.into()),
    };

    let mut report = RecoveryReport::default();
    let mut entries = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        report.lines_read += 1;

        match parse_state_line(&line) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(e) => {
                // a torn final write shows up here; earlier states still hold
                trace!("skipping journal line {}: {}", report.lines_read, e);
                report.corrupt_lines += 1;
            }
        }
    }

    report.entries = entries.len();
    compact_entries(&mut entries);
    report.streams = entries.len();
    Ok((entries, report))
}

/// Latest state per stream, ready to hand to `get_or_create`.
pub fn restore_states(path: impl AsRef<Path>) -> Result<HashMap<StreamKey, ParserState>, JournalError> {
    let (entries, _) = load_checkpoints(path)?;
    Ok(entries.into_iter().map(|e| (e.key, e.state)).collect())
}
