// ## 📦 `src/recovery/persist.rs`

//! File-backed state store: append, rotation, compaction.
//!
//! Every state change is written as one checksummed line and flushed to
//! disk before `on_state_change` returns. Rotation archives the current file
//! (zstd) and replaces it with the latest state per stream, so recovery only
//! ever reads the live file.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::JOURNAL_ARCHIVE_ZSTD_LEVEL;
use crate::recovery::bootstrap::load_checkpoints;
use crate::recovery::checkpoint::ParserState;
use crate::recovery::resume::{format_state_line, parse_state_line, JournalEntry, JournalError};
use crate::stream::{StateStore, StoreError, StreamKey};

#[derive(Debug)]
pub struct CheckpointJournal {
    path: PathBuf,
    writer: BufWriter<File>,
    rotation_limit: usize,
    appended: usize,
    latest: HashMap<StreamKey, JournalEntry>,
}

impl CheckpointJournal {
    /// Open (or create) a journal, indexing any states already in it.
    pub fn open(path: impl AsRef<Path>, rotation_limit: usize) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        let (entries, _report) = load_checkpoints(&path)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            rotation_limit: rotation_limit.max(1),
            appended: 0,
            latest: entries.into_iter().map(|e| (e.key.clone(), e)).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, entry: JournalEntry) -> Result<(), JournalError> {
        let mut line = format_state_line(&entry)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        // CRASH-CONSISTENCY: the state must be on disk before the particle
        // is published.
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;

        self.latest.insert(entry.key.clone(), entry);
        self.appended += 1;
        if self.appended >= self.rotation_limit {
            // the entry is already durable; a failed rotation is retried on
            // the next append
            if let Err(e) = self.rotate() {
                trace!("journal rotation failed: {}", e);
            }
        }
        Ok(())
    }

    pub fn latest(&self, key: &StreamKey) -> Option<ParserState> {
        self.latest.get(key).map(|e| e.state)
    }

    pub fn states(&self) -> HashMap<StreamKey, ParserState> {
        self.latest.iter().map(|(k, e)| (k.clone(), e.state)).collect()
    }

    /// Drop a stream's history (e.g. after its source was removed).
    pub fn forget(&mut self, key: &StreamKey) -> bool {
        self.latest.remove(key).is_some()
    }

    /// Archive the current file and restart it with the compacted states.
    /// Returns the archive path.
    pub fn rotate(&mut self) -> Result<PathBuf, JournalError> {
        let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.6f");
        let archived = PathBuf::from(format!("{}.{}", self.path.display(), timestamp));
        self.rotate_to(archived)
    }

    /// Rotate into a caller-chosen archive path; `.zst` is appended once
    /// compressed.
    ///
    /// The live path always holds a complete journal: the compacted file is
    /// synced beside it and renamed over it only after the archive copy
    /// exists. The writer moves to the new file with that rename. Compression
    /// runs last; if it fails the plain archive stays on disk.
    pub fn rotate_to(&mut self, archived: impl AsRef<Path>) -> Result<PathBuf, JournalError> {
        let archived = archived.as_ref();
        self.writer.flush()?;

        let staged = PathBuf::from(format!("{}.tmp", self.path.display()));
        let mut entries: Vec<&JournalEntry> = self.latest.values().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        let file = OpenOptions::new().create(true).write(true).truncate(true).open(&staged)?;
        let mut writer = BufWriter::new(file);
        for entry in entries {
            let mut line = format_state_line(entry)?;
            line.push('\n');
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()?;
        writer.get_ref().sync_data()?;

        fs::copy(&self.path, archived)?;
        // the staged handle follows the file through the rename
        fs::rename(&staged, &self.path)?;
        self.writer = writer;
        self.appended = 0;

        compress_archive(archived)
    }
}

impl StateStore for CheckpointJournal {
    fn on_state_change(
        &mut self,
        key: &StreamKey,
        state: &ParserState,
        record_fully_ingested: bool,
    ) -> Result<(), StoreError> {
        self.append(JournalEntry {
            key: key.clone(),
            state: *state,
            ingested: record_fully_ingested,
        })
        .map_err(StoreError::from)
    }
}

/// Compress `src` to `src.zst` and delete the uncompressed file.
fn compress_archive(src: &Path) -> Result<PathBuf, JournalError> {
    let dest = PathBuf::from(format!("{}.zst", src.display()));
    let input = File::open(src)?;
    let output = File::create(&dest)?;
    zstd::stream::copy_encode(input, output, JOURNAL_ARCHIVE_ZSTD_LEVEL)?;
    fs::remove_file(src)?;
    Ok(dest)
}

/// Read every entry from a compressed archive, skipping corrupt lines.
pub fn read_archive(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>, JournalError> {
    let decoded = zstd::stream::decode_all(BufReader::new(File::open(path)?))?;
    let text = String::from_utf8_lossy(&decoded);
    Ok(text
        .lines()
        .filter_map(|line| parse_state_line(line).ok().flatten())
        .collect())
}

/// Compaction logic: keep the last entry per stream, in order of last write.
pub fn compact_entries(entries: &mut Vec<JournalEntry>) {
    let mut last_at: HashMap<StreamKey, usize> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        last_at.insert(entry.key.clone(), i);
    }

    let mut i = 0usize;
    entries.retain(|entry| {
        let keep = last_at.get(&entry.key) == Some(&i);
        i += 1;
        keep
    });
}
