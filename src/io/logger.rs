//! Binary run log.
//!
//! A log is a flat sequence of records with no file header:
//!
//! ```text
//! [timestamp_ns: u64 LE][size: u64 LE][payload: size bytes]
//! ```
//!
//! The control loop only appends. [`LogReader`] exists for tooling and tests.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Size of a record header.
pub const RECORD_HEADER_SIZE: usize = 16;

/// Destination for opaque log payloads.
pub trait LogSink: Send {
    fn write_record(&mut self, timestamp_ns: u64, payload: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl LogSink for NullLogger {
    fn write_record(&mut self, _timestamp_ns: u64, _payload: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Appends records to a file.
pub struct BinaryLogger {
    writer: BufWriter<File>,
    path: PathBuf,
    records: u64,
}

impl BinaryLogger {
    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            records: 0,
        })
    }

    /// Create `run_<unix seconds>.bin` inside `dir`, creating the directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::create(dir.join(format!("run_{secs}.bin")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far.
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl LogSink for BinaryLogger {
    fn write_record(&mut self, timestamp_ns: u64, payload: &[u8]) -> Result<()> {
        self.writer.write_all(&timestamp_ns.to_le_bytes())?;
        self.writer.write_all(&(payload.len() as u64).to_le_bytes())?;
        self.writer.write_all(payload)?;
        self.records += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for BinaryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("[Log] Failed to flush {}: {}", self.path.display(), e);
        }
    }
}

/// One record read back from a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp_ns: u64,
    pub payload: Vec<u8>,
}

/// Sequential reader over a log stream.
pub struct LogReader<R> {
    reader: R,
    max_payload: u64,
}

impl LogReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> LogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_payload: 64 * 1024 * 1024,
        }
    }

    /// Next record, `None` at a clean end of stream.
    ///
    /// A stream that ends inside a record is an error.
    pub fn next_record(&mut self) -> Result<Option<LogRecord>> {
        let mut header = [0u8; RECORD_HEADER_SIZE];
        match read_full(&mut self.reader, &mut header)? {
            0 => return Ok(None),
            n if n < RECORD_HEADER_SIZE => {
                return Err(Error::Logger(format!("truncated record header ({n} bytes)")));
            }
            _ => {}
        }

        let (ts, size) = header.split_at(8);
        let timestamp_ns = u64::from_le_bytes(ts.try_into().map_err(|_| bad_header())?);
        let size = u64::from_le_bytes(size.try_into().map_err(|_| bad_header())?);
        if size > self.max_payload {
            return Err(Error::Logger(format!("record of {size} bytes exceeds limit")));
        }

        let mut payload = vec![0u8; size as usize];
        self.reader.read_exact(&mut payload).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::Logger("truncated record payload".into()),
            _ => Error::Io(e),
        })?;

        Ok(Some(LogRecord {
            timestamp_ns,
            payload,
        }))
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn bad_header() -> Error {
    Error::Logger("malformed record header".into())
}

/// Read until `buf` is full or the stream ends; returns bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
