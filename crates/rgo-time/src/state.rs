//! Per-side time control record
//!
//! This module holds the authoritative budget for one player and the
//! operations the protocol layer uses to mutate it:
//! - Bulk reconfiguration (`apply_settings`, GTP `time_settings`)
//! - Remaining-time reports (`apply_time_left_report`, GTP `time_left`)
//! - Move timer start and after-move accounting

use log::{debug, warn};
use std::fmt;

use crate::report::{StonesField, TimeLeftReport};
use crate::types::{Dimension, Period};

/// Wall-clock budget fields (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WallTimeBudget {
    /// Ordinary remaining time
    pub main_time: f64,
    /// Time allotted per byoyomi period, already normalized per stone
    pub byoyomi_time: f64,
    /// Overtime periods still available, 0 = no byoyomi
    pub byoyomi_periods: u32,
    /// When the current move's clock began
    pub timer_start: Option<f64>,
}

/// Budget in the active dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Budget {
    WallTime(WallTimeBudget),
    Simulations { games: u64 },
}

impl Default for Budget {
    fn default() -> Self {
        Budget::WallTime(WallTimeBudget::default())
    }
}

/// Time control record for one side, kept for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeControlState {
    pub period: Period,
    pub budget: Budget,
}

impl TimeControlState {
    /// Wall-time control with the given main time and no byoyomi
    pub fn wall_time(period: Period, main_time: f64) -> Self {
        Self {
            period,
            budget: Budget::WallTime(WallTimeBudget {
                main_time,
                ..Default::default()
            }),
        }
    }

    /// Simulation-count control
    pub fn simulations(period: Period, games: u64) -> Self {
        Self {
            period,
            budget: Budget::Simulations { games },
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self.budget {
            Budget::WallTime(_) => Dimension::WallTime,
            Budget::Simulations { .. } => Dimension::SimulationCount,
        }
    }

    /// Whether any control is active
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.period != Period::None
    }

    /// Wall-time fields, if that is the active dimension
    pub fn wall(&self) -> Option<&WallTimeBudget> {
        match &self.budget {
            Budget::WallTime(wall) => Some(wall),
            Budget::Simulations { .. } => None,
        }
    }

    /// Switch to wall time, keeping the wall fields if already active
    fn wall_mut(&mut self) -> &mut WallTimeBudget {
        if !matches!(self.budget, Budget::WallTime(_)) {
            self.budget = Budget::WallTime(WallTimeBudget::default());
        }
        match &mut self.budget {
            Budget::WallTime(wall) => wall,
            Budget::Simulations { .. } => unreachable!("budget switched to wall time above"),
        }
    }

    /// Update time settings according to GTP time_settings or kgs-time_settings
    ///
    /// A byoyomi without stones means "no effective limit" and disables the
    /// control so the engine uses its defaults.
    pub fn apply_settings(
        &mut self,
        main_time: u32,
        byoyomi_time: u32,
        byoyomi_stones: u32,
        byoyomi_periods: u32,
    ) {
        if byoyomi_time > 0 && byoyomi_stones == 0 {
            debug!("[TimeSettings] byoyomi {byoyomi_time}s without stones, control disabled");
            self.period = Period::None;
            return;
        }

        let mut byoyomi = f64::from(byoyomi_time);
        // Canadian blocks cover several stones, keep seconds per move
        if byoyomi_stones > 0 {
            byoyomi /= f64::from(byoyomi_stones);
        }

        self.period = Period::TotalRemaining;
        self.budget = Budget::WallTime(WallTimeBudget {
            main_time: f64::from(main_time),
            byoyomi_time: byoyomi,
            byoyomi_periods,
            timer_start: None,
        });
        debug!(
            "[TimeSettings] main={}s byoyomi={:.2}s/move periods={}",
            main_time, byoyomi, byoyomi_periods
        );
    }

    /// Decode the overloaded stones field of a time_left report
    ///
    /// With period byoyomi configured, controllers report remaining periods
    /// in the stones field.
    pub fn decode_stones_field(&self, stones_left: u32) -> StonesField {
        let periods = self.wall().map_or(0, |wall| wall.byoyomi_periods);
        if periods > 0 && stones_left > 0 {
            StonesField::PeriodsLeft(stones_left)
        } else {
            StonesField::StonesLeft(stones_left)
        }
    }

    /// Update time information according to a decoded time_left report
    ///
    /// # Panics
    /// When no control is active: the protocol layer and this record are out
    /// of sync.
    pub fn apply_time_left_report(&mut self, report: TimeLeftReport) {
        assert!(
            self.is_enabled(),
            "time_left report received while time control is disabled"
        );

        let time_left = report.time_left.max(0.0);
        let wall = self.wall_mut();

        let stones_left = match report.stones {
            StonesField::PeriodsLeft(periods) => {
                wall.byoyomi_periods = periods;
                1
            }
            StonesField::StonesLeft(stones) => stones,
        };

        if stones_left == 0 {
            // Main time, byoyomi_time kept fully charged
            wall.main_time = time_left;
            self.period = Period::TotalRemaining;
            debug!("[TimeLeft] main time {time_left:.2}s");
        } else {
            wall.main_time = 0.0;
            wall.byoyomi_time = time_left / f64::from(stones_left);
            debug!(
                "[TimeLeft] byoyomi {time_left:.2}s for {stones_left} stones ({:.2}s/move)",
                wall.byoyomi_time
            );
            self.period = Period::PerMove;
        }
    }

    /// Decode and apply a raw GTP time_left report
    pub fn apply_time_left(&mut self, time_left: u32, stones_left: u32) {
        let report = TimeLeftReport::decode(self, f64::from(time_left), stones_left);
        self.apply_time_left_report(report);
    }

    /// Whether we are in byoyomi, or should play as if we were
    ///
    /// True when main time is gone or no longer exceeds one byoyomi period
    /// (within `tolerance`). Without byoyomi this is always false.
    ///
    /// # Panics
    /// When the budget is not wall time.
    pub fn in_byoyomi_with(&self, tolerance: f64) -> bool {
        let wall = match self.wall() {
            Some(wall) => wall,
            None => panic!("byoyomi query on a simulation-count budget"),
        };
        if wall.byoyomi_time == 0.0 {
            return false;
        }
        wall.main_time == 0.0 || wall.main_time <= wall.byoyomi_time + tolerance
    }

    /// `in_byoyomi_with` using the default tolerance
    pub fn in_byoyomi(&self) -> bool {
        self.in_byoyomi_with(crate::TimeParameters::default().byoyomi_tolerance)
    }

    /// Start our move timer at `now`
    ///
    /// Only meaningful for active wall-time control; otherwise ignored.
    pub fn start_move_timer(&mut self, now: f64) {
        if !self.is_enabled() {
            return;
        }
        if let Budget::WallTime(wall) = &mut self.budget {
            wall.timer_start = Some(now);
        }
    }

    /// Charge the time spent on our last move against the budget
    ///
    /// Main time is drained first; any overspend runs into byoyomi where
    /// each full period spent consumes one period. Per-move budgets refill
    /// every move and are left alone.
    pub fn record_time_spent(&mut self, spent: f64) {
        if self.period != Period::TotalRemaining {
            debug!("[TimeBudget] no session budget, ignoring {spent:.2}s spent");
            return;
        }
        let Budget::WallTime(wall) = &mut self.budget else {
            debug!("[TimeBudget] simulation-count budget, ignoring {spent:.2}s spent");
            return;
        };

        let mut remaining = spent.max(0.0);
        if wall.main_time > 0.0 {
            if remaining < wall.main_time {
                wall.main_time -= remaining;
                return;
            }
            remaining -= wall.main_time;
            wall.main_time = 0.0;
            debug!("[TimeBudget] main time exhausted, {remaining:.2}s into byoyomi");
            if remaining == 0.0 {
                return;
            }
        }

        if wall.byoyomi_time <= 0.0 || wall.byoyomi_periods == 0 {
            if remaining > 0.0 {
                warn!("[TimeBudget] overspent {remaining:.2}s with no byoyomi left");
            }
            return;
        }

        let mut periods_used = 0u32;
        while remaining >= wall.byoyomi_time && wall.byoyomi_periods > 0 {
            remaining -= wall.byoyomi_time;
            wall.byoyomi_periods -= 1;
            periods_used += 1;
        }
        if periods_used > 0 {
            debug!(
                "[TimeBudget] consumed {} byoyomi period(s), {} left",
                periods_used, wall.byoyomi_periods
            );
        }
        if wall.byoyomi_periods == 0 {
            warn!("[TimeBudget] all byoyomi periods consumed, time forfeit");
        }
    }
}

impl fmt::Display for TimeControlState {
    /// Renders the textual spec form (`_600`, `=5000`, ...) when it exists
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.period {
            Period::None => return write!(f, "none"),
            Period::PerMove => "",
            Period::TotalRemaining => "_",
        };
        match &self.budget {
            Budget::Simulations { games } => write!(f, "{prefix}={games}"),
            Budget::WallTime(wall) => {
                write!(f, "{prefix}{}", wall.main_time)?;
                if wall.byoyomi_time > 0.0 {
                    write!(f, " (byoyomi {}s x{})", wall.byoyomi_time, wall.byoyomi_periods)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_settings_byoyomi_without_stones_disables() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(0, 10, 0, 1);
        assert_eq!(ti.period, Period::None);
        assert!(!ti.is_enabled());
    }

    #[test]
    fn test_settings_normalizes_canadian_block() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(600, 300, 25, 1);
        assert_eq!(ti.period, Period::TotalRemaining);
        assert_eq!(ti.dimension(), Dimension::WallTime);

        let wall = ti.wall().unwrap();
        assert!(approx(wall.main_time, 600.0));
        assert!(approx(wall.byoyomi_time, 12.0));
        assert_eq!(wall.byoyomi_periods, 1);
        assert_eq!(wall.timer_start, None);
    }

    #[test]
    fn test_settings_reset_timer_and_switch_dimension() {
        let mut ti = TimeControlState::simulations(Period::PerMove, 1000);
        ti.apply_settings(60, 0, 0, 0);
        assert_eq!(ti.dimension(), Dimension::WallTime);

        ti.start_move_timer(5.0);
        assert_eq!(ti.wall().unwrap().timer_start, Some(5.0));
        ti.apply_settings(60, 0, 0, 0);
        assert_eq!(ti.wall().unwrap().timer_start, None);
    }

    #[test]
    fn test_time_left_main_time_keeps_byoyomi() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(600, 30, 1, 0);
        ti.apply_time_left(420, 0);

        assert_eq!(ti.period, Period::TotalRemaining);
        let wall = ti.wall().unwrap();
        assert!(approx(wall.main_time, 420.0));
        assert!(approx(wall.byoyomi_time, 30.0));
    }

    #[test]
    fn test_time_left_canadian_byoyomi() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(0, 300, 25, 0);
        ti.apply_time_left(30, 5);

        assert_eq!(ti.period, Period::PerMove);
        let wall = ti.wall().unwrap();
        assert!(approx(wall.main_time, 0.0));
        assert!(approx(wall.byoyomi_time, 6.0));
        assert!(ti.in_byoyomi());
    }

    #[test]
    fn test_time_left_reinterprets_stones_as_periods() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(0, 30, 1, 5);
        ti.apply_time_left(30, 3);

        assert_eq!(ti.period, Period::PerMove);
        let wall = ti.wall().unwrap();
        assert_eq!(wall.byoyomi_periods, 3);
        assert!(approx(wall.byoyomi_time, 30.0));
    }

    #[test]
    #[should_panic(expected = "time control is disabled")]
    fn test_time_left_requires_active_control() {
        let mut ti = TimeControlState::default();
        ti.apply_time_left(30, 0);
    }

    #[test]
    fn test_in_byoyomi_predicate() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(60, 0, 0, 0);
        assert!(!ti.in_byoyomi(), "no byoyomi configured");

        ti.apply_settings(60, 30, 1, 3);
        assert!(!ti.in_byoyomi());

        ti.apply_time_left(30, 0);
        assert!(ti.in_byoyomi(), "main time no longer exceeds a period");
    }

    #[test]
    fn test_start_timer_ignored_when_disabled() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(0, 10, 0, 1);
        ti.start_move_timer(42.0);
        assert_eq!(ti.wall().unwrap().timer_start, None);
    }

    #[test]
    fn test_record_time_spent_drains_main_then_periods() {
        let mut ti = TimeControlState::default();
        ti.apply_settings(10, 5, 1, 3);

        ti.record_time_spent(4.0);
        assert!(approx(ti.wall().unwrap().main_time, 6.0));

        // 6s finishes main time, 5s more consumes one period, 1s remains in the next
        ti.record_time_spent(12.0);
        let wall = ti.wall().unwrap();
        assert!(approx(wall.main_time, 0.0));
        assert_eq!(wall.byoyomi_periods, 2);

        ti.record_time_spent(4.9);
        assert_eq!(ti.wall().unwrap().byoyomi_periods, 2);

        ti.record_time_spent(11.0);
        assert_eq!(ti.wall().unwrap().byoyomi_periods, 0);
    }

    #[test]
    fn test_record_time_spent_skips_per_move_budget() {
        let mut ti = TimeControlState::wall_time(Period::PerMove, 5.0);
        ti.record_time_spent(4.0);
        assert!(approx(ti.wall().unwrap().main_time, 5.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeControlState::wall_time(Period::TotalRemaining, 600.0).to_string(), "_600");
        assert_eq!(TimeControlState::simulations(Period::PerMove, 5000).to_string(), "=5000");
        assert_eq!(TimeControlState::default().to_string(), "none");
    }
}
