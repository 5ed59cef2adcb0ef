//! Textual time specifications
//!
//! Grammar: `[_](=<count>|<seconds>)`
//! - a leading `_` makes the budget cover the whole session, otherwise it
//!   is a per-move allotment
//! - `=<count>` budgets a number of playouts, otherwise `<seconds>` is
//!   wall time and may carry a fractional part

use std::str::FromStr;

use crate::state::{Budget, TimeControlState, WallTimeBudget};
use crate::types::Period;

/// Errors from parsing a time specification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeSpecError {
    #[error("Empty time specification")]
    Empty,
    #[error("Invalid playout count: {0:?}")]
    InvalidCount(String),
    #[error("Invalid number of seconds: {0:?}")]
    InvalidSeconds(String),
}

/// Parse a time specification into a fresh control record
pub fn parse_time_spec(text: &str) -> Result<TimeControlState, TimeSpecError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TimeSpecError::Empty);
    }

    let (period, rest) = match text.strip_prefix('_') {
        Some(rest) => (Period::TotalRemaining, rest),
        None => (Period::PerMove, text),
    };

    let budget = if let Some(count) = rest.strip_prefix('=') {
        let games = count
            .parse::<u64>()
            .map_err(|_| TimeSpecError::InvalidCount(count.to_string()))?;
        Budget::Simulations { games }
    } else {
        if !rest.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(TimeSpecError::InvalidSeconds(rest.to_string()));
        }
        let main_time = rest
            .parse::<f64>()
            .ok()
            .filter(|seconds| seconds.is_finite())
            .ok_or_else(|| TimeSpecError::InvalidSeconds(rest.to_string()))?;
        Budget::WallTime(WallTimeBudget {
            main_time,
            byoyomi_time: 0.0,
            byoyomi_periods: 0,
            timer_start: None,
        })
    };

    Ok(TimeControlState { period, budget })
}

impl FromStr for TimeControlState {
    type Err = TimeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_spec(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimension;

    #[test]
    fn test_parse_per_move_seconds() {
        let ti = parse_time_spec("5.5").unwrap();
        assert_eq!(ti.period, Period::PerMove);
        assert_eq!(ti.dimension(), Dimension::WallTime);
        let wall = ti.wall().unwrap();
        assert_eq!(wall.main_time, 5.5);
        assert_eq!(wall.byoyomi_time, 0.0);
        assert_eq!(wall.byoyomi_periods, 0);
        assert_eq!(wall.timer_start, None);
    }

    #[test]
    fn test_parse_total_seconds() {
        let ti: TimeControlState = "_600".parse().unwrap();
        assert_eq!(ti.period, Period::TotalRemaining);
        assert_eq!(ti.wall().unwrap().main_time, 600.0);
    }

    #[test]
    fn test_parse_simulation_counts() {
        let ti = parse_time_spec("=5000").unwrap();
        assert_eq!(ti.period, Period::PerMove);
        assert_eq!(ti.budget, Budget::Simulations { games: 5000 });

        let ti = parse_time_spec("_=90000").unwrap();
        assert_eq!(ti.period, Period::TotalRemaining);
        assert_eq!(ti.budget, Budget::Simulations { games: 90000 });
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_time_spec("  "), Err(TimeSpecError::Empty));
        assert_eq!(parse_time_spec("abc"), Err(TimeSpecError::InvalidSeconds("abc".into())));
        assert_eq!(parse_time_spec("_"), Err(TimeSpecError::InvalidSeconds(String::new())));
        assert_eq!(parse_time_spec("-5"), Err(TimeSpecError::InvalidSeconds("-5".into())));
        assert_eq!(parse_time_spec("5s"), Err(TimeSpecError::InvalidSeconds("5s".into())));
        assert_eq!(parse_time_spec("=12x"), Err(TimeSpecError::InvalidCount("12x".into())));
        assert_eq!(parse_time_spec("_="), Err(TimeSpecError::InvalidCount(String::new())));
    }
}
