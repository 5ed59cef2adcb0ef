//! Time management for a Go engine
//!
//! This crate decides, before a search starts on a move, how long it is
//! advised and allowed to think. It covers:
//! - Parsing of textual time specifications (`parse_time_spec`)
//! - The per-side time control record and its GTP update paths
//!   (`time_settings` / `time_left`)
//! - Per-move stop conditions with lag reserve, byoyomi period reservation
//!   and fuseki/yose aware pacing (`compute_stop_conditions`)
//!
//! # State Management
//!
//! `TimeControlState` is the authoritative control record and is only
//! mutated by the protocol thread between moves. The per-move working values
//! (max / recommended time) are derived fresh for every move and returned as
//! a `MoveAllotment`, so the order in which settings, reports and timer
//! starts arrive does not leak into the next move's budget.

pub mod allocation;
pub mod clock;
pub mod manager;
pub mod parameters;
pub mod report;
pub mod spec;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use allocation::{
    compute_stop_conditions, derive_move_allotment, plan_stop_conditions, StopPlan, WallTimePlan,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::TimeManager;
pub use parameters::{constants, TimeParameterError, TimeParameters, TimeParametersBuilder};
pub use report::{StonesField, TimeLeftReport};
pub use spec::{parse_time_spec, TimeSpecError};
pub use state::{Budget, TimeControlState, WallTimeBudget};
pub use types::{
    Dimension, GameProgress, GameSnapshot, MoveAllotment, Period, PhaseBounds, StopThresholds,
    StopVerdict,
};
