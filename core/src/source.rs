// ## 📂 File: `src/source.rs`
// ## Normalized byte sources (read-only)

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;

use bytes::Bytes;

use crate::types::IngestError;

/// Read-only view over a bounded or growing byte source.
///
/// The engine never writes through this trait. `read` is positional so a
/// resumed decoder can pick up at its checkpointed offset without relying
/// on the source's own cursor.
pub trait ByteSource: Send {
    /// Total bytes currently available.
    fn len(&mut self) -> io::Result<u64>;

    /// Move the source cursor to `offset`.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Read up to `length` bytes starting at `offset`. Returns fewer bytes
    /// only when the end of the source is reached.
    fn read(&mut self, offset: u64, length: usize) -> io::Result<Bytes>;
}

/// Any seekable reader usable as a source.
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn ReadSeek>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Normalize an input into a boxed byte source
pub fn open_source(src: InputSource) -> Result<Box<dyn ByteSource>, IngestError> {
    let source: Box<dyn ByteSource> = match src {
        InputSource::Reader(r) => Box::new(ReaderSource::new(r)),
        InputSource::File(p) => Box::new(FileSource::open(p)?),
        InputSource::Memory(b) => Box::new(MemorySource::new(b)),
    };
    Ok(source)
}

// ================= In-memory =================

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Bytes,
    cursor: u64,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), cursor: 0 }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

impl ByteSource for MemorySource {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.cursor = offset;
        Ok(())
    }

    fn read(&mut self, offset: u64, length: usize) -> io::Result<Bytes> {
        let total = self.data.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(total);
        let end = start.saturating_add(length).min(total);
        self.cursor = end as u64;
        Ok(self.data.slice(start..end))
    }
}

// ================= Reader-backed =================

#[derive(Debug)]
pub struct ReaderSource<R: Read + Seek + Send> {
    inner: R,
}

/// File-shaped source as written incrementally by remote hardware.
pub type FileSource = ReaderSource<File>;

impl FileSource {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        Ok(ReaderSource::new(File::open(path.into())?))
    }
}

impl<R: Read + Seek + Send> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl ReaderSource<Cursor<Vec<u8>>> {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl<R: Read + Seek + Send> ByteSource for ReaderSource<R> {
    fn len(&mut self) -> io::Result<u64> {
        let here = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(here))?;
        Ok(end)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read(&mut self, offset: u64, length: usize) -> io::Result<Bytes> {
        self.inner.seek(SeekFrom::Start(offset))?;
        read_exact_or_eof(&mut self.inner, length)
    }
}

// Short reads are retried until `len` bytes or EOF.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> io::Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        let n = match r.read(&mut buf[off..]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }
        off += n;
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}
