//! Bounded, thread-safe sample buffer shared between a producer thread and
//! the control loop.
//!
//! Pushing evicts the oldest sample once capacity is reached. Reads are
//! non-destructive snapshots: the consumer never drains the buffer.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::Timestamped;

/// Fixed-capacity circular buffer of timestamped samples.
pub struct SampleBuffer<T> {
    samples: Mutex<VecDeque<Arc<Timestamped<T>>>>,
    capacity: usize,
}

impl<T> SampleBuffer<T> {
    /// Create an empty buffer.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sample buffer capacity must be non-zero");
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&self, sample: Timestamped<T>) {
        let mut samples = self.samples.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(Arc::new(sample));
    }

    /// All buffered samples, oldest to newest.
    pub fn snapshot(&self) -> Vec<Arc<Timestamped<T>>> {
        self.samples.lock().iter().cloned().collect()
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<Arc<Timestamped<T>>> {
        self.samples.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the buffer holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }
}
