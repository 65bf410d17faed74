//! Per-run context passed into every tick.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::state::NavState;

/// Where a state was entered.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    at_ms: u64,
    encoder_deg: f32,
}

/// Stop signal plus state-local timers and encoder references.
///
/// Entering a state replaces its entry, so every visit starts with a fresh
/// timer and encoder reference.
#[derive(Debug, Default)]
pub struct RunContext {
    stop: Arc<AtomicBool>,
    entries: HashMap<NavState, Entry>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context sharing an existing stop flag (e.g. one set by a signal
    /// handler).
    pub fn with_stop_flag(stop: Arc<AtomicBool>) -> Self {
        Self {
            stop,
            entries: HashMap::new(),
        }
    }

    /// Handle for other threads to request a stop.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Record entry into `state`.
    pub fn enter(&mut self, state: NavState, now_ms: u64, encoder_deg: f32) {
        self.entries.insert(state, Entry {
            at_ms: now_ms,
            encoder_deg,
        });
    }

    /// Milliseconds spent in `state`, `None` if it was never entered.
    pub fn elapsed_ms(&self, state: NavState, now_ms: u64) -> Option<u64> {
        self.entries
            .get(&state)
            .map(|e| now_ms.saturating_sub(e.at_ms))
    }

    /// Encoder travel since entering `state`.
    pub fn encoder_travel(&self, state: NavState, encoder_deg: f32) -> Option<f32> {
        self.entries
            .get(&state)
            .map(|e| encoder_deg - e.encoder_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_reset_on_entry() {
        let mut ctx = RunContext::new();
        assert_eq!(ctx.elapsed_ms(NavState::Approach, 100), None);

        ctx.enter(NavState::Approach, 100, 10.0);
        assert_eq!(ctx.elapsed_ms(NavState::Approach, 350), Some(250));
        assert_eq!(ctx.encoder_travel(NavState::Approach, 55.0), Some(45.0));

        ctx.enter(NavState::Approach, 400, 60.0);
        assert_eq!(ctx.elapsed_ms(NavState::Approach, 450), Some(50));
        assert_eq!(ctx.encoder_travel(NavState::Approach, 55.0), Some(-5.0));
    }

    #[test]
    fn test_shared_stop_flag() {
        let ctx = RunContext::new();
        let flag = ctx.stop_flag();
        assert!(!ctx.stop_requested());
        flag.store(true, Ordering::Relaxed);
        assert!(ctx.stop_requested());
    }
}
