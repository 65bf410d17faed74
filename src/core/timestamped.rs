//! Timestamp wrapper and the process clock that stamps sensor samples.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Sample tagged with its capture time.
///
/// Timestamps are microseconds on the monotonic [`Clock`] shared by every
/// producer, so samples from different sensors can be compared directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    /// The wrapped data
    pub data: T,
    /// Capture time in microseconds since clock start
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    /// Create a new timestamped value.
    #[inline]
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }

    /// Map the inner data while preserving timestamp.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Timestamped<U> {
        Timestamped {
            data: f(self.data),
            timestamp_us: self.timestamp_us,
        }
    }

    /// Timestamp in nanoseconds, as written to the binary log.
    #[inline]
    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_us.saturating_mul(1_000)
    }
}

/// Monotonic process clock.
///
/// Cheap to copy; every copy measures from the same start instant.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    /// Start a new clock at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Microseconds since the clock started.
    #[inline]
    pub fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Stamp a value with the current time.
    #[inline]
    pub fn stamp<T>(&self, data: T) -> Timestamped<T> {
        Timestamped::new(data, self.now_us())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_map() {
        let ts = Timestamped::new(21i32, 1500);
        let doubled = ts.map(|x| x * 2);

        assert_eq!(doubled.data, 42);
        assert_eq!(doubled.timestamp_us, 1500);
        assert_eq!(doubled.timestamp_ns(), 1_500_000);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = Clock::new();
        let a = clock.now_us();
        let b = clock.stamp(()).timestamp_us;
        assert!(b >= a);
    }
}
