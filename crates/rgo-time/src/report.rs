//! Remaining-time reports from an external controller
//!
//! GTP `time_left <time> <stones>` overloads the stones field: under period
//! byoyomi some servers (kgs) send the number of remaining periods there.
//! The report is decoded once at the protocol boundary so the rest of the
//! crate never has to guess which meaning applies.

use crate::state::TimeControlState;

/// Meaning of the stones field in a time_left report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StonesField {
    /// Stones still to be played in the current period, 0 = main time
    StonesLeft(u32),
    /// Byoyomi periods still available
    PeriodsLeft(u32),
}

/// Decoded time_left report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeLeftReport {
    /// Seconds left on the clock
    pub time_left: f64,
    pub stones: StonesField,
}

impl TimeLeftReport {
    /// Report in main time
    pub fn main_time(time_left: f64) -> Self {
        Self {
            time_left,
            stones: StonesField::StonesLeft(0),
        }
    }

    /// Decode a raw report against the side's current settings
    pub fn decode(state: &TimeControlState, time_left: f64, stones_left: u32) -> Self {
        Self {
            time_left,
            stones: state.decode_stones_field(stones_left),
        }
    }
}
