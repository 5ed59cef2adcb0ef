//! Wall-time source and sleep primitive
//!
//! `SystemClock` reads the real clock. `ManualClock` only moves when told to,
//! which keeps lag accounting deterministic in tests and in the simulator.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source used by the budget calculator and by polling search workers
pub trait Clock: Send + Sync {
    /// Current wall time in seconds
    fn now(&self) -> f64;

    /// Suspend the caller for `seconds`; non-positive intervals return at once
    fn sleep(&self, seconds: f64);
}

/// Real wall clock (seconds since the Unix epoch)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs_f64(),
            // Clock set before 1970: report negative offset rather than fail
            Err(err) => -err.duration().as_secs_f64(),
        }
    }

    fn sleep(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(seconds));
        }
    }
}

/// Manually driven clock
///
/// Clones share the same time value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Create a clock starting at `start` seconds
    pub fn new(start: f64) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `seconds` (ignored when negative)
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            *self.current.lock() += seconds;
        }
    }

    /// Set the clock to an absolute value
    pub fn set(&self, seconds: f64) {
        *self.current.lock() = seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.current.lock()
    }

    fn sleep(&self, seconds: f64) {
        self.advance(seconds);
    }
}
