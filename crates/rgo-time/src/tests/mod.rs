//! Time management scenario tests

mod pacing_tests;

use crate::{GameSnapshot, ManualClock, PhaseBounds, TimeManager, TimeParameters};

/// Manager on a manual clock starting at `start`
pub(crate) fn manual_manager(start: f64) -> (TimeManager<ManualClock>, ManualClock) {
    let clock = ManualClock::new(start);
    let tm = TimeManager::new(clock.clone(), TimeParameters::default(), PhaseBounds::default());
    (tm, clock)
}

/// 19x19 game at the given progress
pub(crate) fn game(moves_left: u32, moves_played: u32) -> GameSnapshot {
    GameSnapshot {
        moves_left,
        board_scale: 361,
        moves_played,
    }
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
