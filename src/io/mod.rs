//! Run log output.

mod logger;

pub use logger::{BinaryLogger, LogReader, LogRecord, LogSink, NullLogger, RECORD_HEADER_SIZE};
