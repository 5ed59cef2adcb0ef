//! Per-move stop conditions
//!
//! Converts the control record into a desired and a worst stop point for the
//! move about to be searched. Wall-time budgets go through three steps:
//! 1. Lag accounting against the move timer
//! 2. Conversion of the record into a per-move `MoveAllotment`
//! 3. Desired/worst split, paced by game phase in main time

use log::debug;

use crate::clock::Clock;
use crate::parameters::{constants, TimeParameters};
use crate::state::{Budget, TimeControlState, WallTimeBudget};
use crate::types::{GameProgress, MoveAllotment, Period, PhaseBounds, StopThresholds};

/// Breakdown of a wall-time decision, in seconds relative to the move timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallTimePlan {
    pub timer_start: f64,
    pub allotment: MoveAllotment,
    /// Lag reserve subtracted from both deadlines
    pub net_lag: f64,
    pub desired_time: f64,
    pub worst_time: f64,
}

/// Stop thresholds plus the reasoning behind them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopPlan {
    pub thresholds: StopThresholds,
    /// Absent for playout budgets
    pub wall: Option<WallTimePlan>,
}

#[inline]
fn checked_moves_left<P: GameProgress + ?Sized>(progress: &P) -> u32 {
    let moves_left = progress.estimated_moves_left();
    assert!(moves_left > 0, "moves-left estimate must be positive");
    moves_left
}

/// Derive the per-move allotment from the control record
///
/// `net_lag` is the lag reserve accumulated so far for this move; it limits
/// how many main-time moves can be played at byoyomi pace.
///
/// # Panics
/// When the record is not an active wall-time control, or when a
/// session-level budget meets a zero moves-left estimate.
pub fn derive_move_allotment<P: GameProgress + ?Sized>(
    state: &TimeControlState,
    progress: &P,
    net_lag: f64,
) -> MoveAllotment {
    assert!(state.is_enabled(), "allotment requested without an active time control");
    let wall = match state.wall() {
        Some(wall) => wall,
        None => panic!("allotment requested for a simulation-count budget"),
    };

    let mut max_time = if wall.main_time > 0.0 {
        wall.main_time
    } else if state.period == Period::PerMove {
        // Primed by a byoyomi report: one period is the whole move
        wall.byoyomi_time
    } else {
        0.0
    };
    let mut recommended_time = max_time;

    if state.period == Period::TotalRemaining {
        let mut moves_left = checked_moves_left(progress);
        if wall.byoyomi_time > 0.0 {
            max_time += reserved_byoyomi(wall);
            recommended_time = max_time;

            // Do not play faster in main time than byoyomi would allow:
            // max_time / main_moves >= byoyomi_time - net_lag
            let actual_byoyomi = wall.byoyomi_time - net_lag;
            if actual_byoyomi > 0.0 {
                let main_moves = (max_time / actual_byoyomi) as u32;
                moves_left = moves_left.min(main_moves).max(1);
            }
        }
        recommended_time /= f64::from(moves_left);
    }

    // Keep the engine free of negative budgets
    let allotment = MoveAllotment {
        max_time: max_time.max(0.0),
        recommended_time: recommended_time.max(0.0),
    };
    assert!(
        allotment.recommended_time <= allotment.max_time + constants::ALLOTMENT_EPSILON,
        "recommended time {} exceeds max time {}",
        allotment.recommended_time,
        allotment.max_time
    );
    allotment
}

/// Byoyomi time usable as extra main time
///
/// With N > 1 periods, N - 1 of them count as main time and the last one is
/// kept as insurance against lag. A single (Canadian) period counts once.
fn reserved_byoyomi(wall: &WallTimeBudget) -> f64 {
    let mut reserved = wall.byoyomi_time;
    if wall.byoyomi_periods > 2 {
        reserved += f64::from(wall.byoyomi_periods - 2) * wall.byoyomi_time;
    }
    reserved
}

/// Compute stop conditions for the move about to be searched
///
/// Starts the move timer if it is not running yet (first move of a session).
/// A session playout count is split over the moves left once and the record
/// becomes a per-move count.
pub fn compute_stop_conditions<P, C>(
    state: &mut TimeControlState,
    progress: &P,
    bounds: PhaseBounds,
    clock: &C,
    params: &TimeParameters,
) -> StopThresholds
where
    P: GameProgress + ?Sized,
    C: Clock + ?Sized,
{
    plan_stop_conditions(state, progress, bounds, clock, params).thresholds
}

/// `compute_stop_conditions` with the intermediate values kept
pub fn plan_stop_conditions<P, C>(
    state: &mut TimeControlState,
    progress: &P,
    bounds: PhaseBounds,
    clock: &C,
    params: &TimeParameters,
) -> StopPlan
where
    P: GameProgress + ?Sized,
    C: Clock + ?Sized,
{
    // We must have _some_ limits by now, be it engine defaults
    assert!(state.is_enabled(), "stop conditions requested without an active time control");

    let wall = match &mut state.budget {
        Budget::Simulations { games } => {
            // Split a session count once, then keep the per-move share
            if state.period == Period::TotalRemaining {
                *games /= u64::from(checked_moves_left(progress));
                state.period = Period::PerMove;
                debug!("[TimeBudget] session playouts split to {} per move", *games);
            }
            // No grace region for playout budgets: worst == desired
            return StopPlan {
                thresholds: StopThresholds::Playouts {
                    desired: *games,
                    worst: *games,
                },
                wall: None,
            };
        }
        Budget::WallTime(wall) => wall,
    };

    let mut net_lag = params.max_net_lag;
    let now = clock.now();
    let timer_start = match wall.timer_start {
        Some(start) => {
            net_lag += now - start;
            start
        }
        None => {
            // First move of the session
            wall.timer_start = Some(now);
            now
        }
    };
    let byoyomi_time = wall.byoyomi_time;

    let allotment = derive_move_allotment(state, progress, net_lag);

    // Cutting it close: keep a larger share of the period in reserve
    let safe_margin = params.byoyomi_safety_margin(byoyomi_time);
    if safe_margin > params.max_net_lag
        && allotment.recommended_time >= allotment.max_time - net_lag
    {
        net_lag = safe_margin;
    }

    debug!(
        "[TimeBudget] recommended={:.2}s max={:.2}s byoyomi={:.2}s lag={:.2}s",
        allotment.recommended_time, allotment.max_time, byoyomi_time, net_lag
    );

    let mut desired_time = allotment.recommended_time;
    let mut worst_time;
    if state.in_byoyomi_with(params.byoyomi_tolerance) {
        // recommended == average(desired, worst)
        worst_time = desired_time * params.max_byoyomi_time_extension;
        desired_time *= 2.0 - params.max_byoyomi_time_extension;
    } else {
        desired_time = paced_desired_time(desired_time, allotment.max_time, progress, bounds, params);
        worst_time = desired_time * params.max_main_time_extension;
    }
    worst_time = worst_time.min(allotment.max_time);
    desired_time = desired_time.min(worst_time);

    debug!("[TimeBudget] desired={desired_time:.2}s worst={worst_time:.2}s");

    // Both stop points may be in the past if there was too much lag
    StopPlan {
        thresholds: StopThresholds::Deadline {
            desired: timer_start + desired_time - net_lag,
            worst: timer_start + worst_time - net_lag,
        },
        wall: Some(WallTimePlan {
            timer_start,
            allotment,
            net_lag,
            desired_time,
            worst_time,
        }),
    }
}

/// Spend extra before yose: ramp up through fuseki, then play at the
/// longest pace main time can sustain until yose starts
fn paced_desired_time<P: GameProgress + ?Sized>(
    desired_time: f64,
    max_time: f64,
    progress: &P,
    bounds: PhaseBounds,
    params: &TimeParameters,
) -> f64 {
    let (fuseki_end, yose_start) = bounds.to_moves(progress.board_scale());
    assert!(
        fuseki_end < yose_start,
        "fuseki end (move {fuseki_end}) must come before yose start (move {yose_start})"
    );

    let moves_played = progress.moves_played();
    if moves_played >= yose_start {
        return desired_time;
    }

    // Only every other ply is ours
    let moves_to_yose = (yose_start - moves_played) / 2;
    let left_at_yose_start = progress
        .estimated_moves_left()
        .saturating_sub(moves_to_yose)
        .max(params.min_moves_left);
    let longest_time = max_time / f64::from(left_at_yose_start);

    if longest_time < desired_time {
        // Already generous
        desired_time
    } else if moves_played < fuseki_end {
        desired_time
            + (longest_time - desired_time) * f64::from(moves_played) / f64::from(fuseki_end)
    } else {
        longest_time
    }
}
