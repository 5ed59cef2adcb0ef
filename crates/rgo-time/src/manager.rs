//! Time manager facade
//!
//! Bundles the clock, tunable parameters and pacing boundaries so the
//! protocol layer only hands over the per-side record and the game queries.

use crate::allocation::{plan_stop_conditions, StopPlan};
use crate::clock::{Clock, SystemClock};
use crate::parameters::TimeParameters;
use crate::state::TimeControlState;
use crate::types::{GameProgress, PhaseBounds, StopThresholds};

/// Time manager coordinating per-move budget decisions
#[derive(Debug, Clone)]
pub struct TimeManager<C: Clock = SystemClock> {
    clock: C,
    params: TimeParameters,
    bounds: PhaseBounds,
}

impl TimeManager<SystemClock> {
    /// Manager on the real clock with default parameters
    pub fn system() -> Self {
        Self::new(SystemClock, TimeParameters::default(), PhaseBounds::default())
    }
}

impl Default for TimeManager<SystemClock> {
    fn default() -> Self {
        Self::system()
    }
}

impl<C: Clock> TimeManager<C> {
    pub fn new(clock: C, params: TimeParameters, bounds: PhaseBounds) -> Self {
        Self {
            clock,
            params,
            bounds,
        }
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn params(&self) -> &TimeParameters {
        &self.params
    }

    #[inline]
    pub fn bounds(&self) -> PhaseBounds {
        self.bounds
    }

    /// Current wall time from the manager's clock
    #[inline]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Start the side's move timer (GTP `play` for the opponent's move)
    pub fn start_move_timer(&self, state: &mut TimeControlState) {
        state.start_move_timer(self.clock.now());
    }

    /// Stop thresholds for the move about to be searched
    pub fn stop_conditions<P: GameProgress + ?Sized>(
        &self,
        state: &mut TimeControlState,
        progress: &P,
    ) -> StopThresholds {
        self.plan(state, progress).thresholds
    }

    /// Stop thresholds with the wall-time breakdown
    pub fn plan<P: GameProgress + ?Sized>(
        &self,
        state: &mut TimeControlState,
        progress: &P,
    ) -> StopPlan {
        plan_stop_conditions(state, progress, self.bounds, &self.clock, &self.params)
    }
}
