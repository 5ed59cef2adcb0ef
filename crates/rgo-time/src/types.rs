//! Type definitions for time management

/// How the stored budget relates to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// No control active, the engine falls back to its defaults
    #[default]
    None,
    /// The stored budget is one move's allotment (byoyomi style)
    PerMove,
    /// The stored budget covers the whole remaining session
    TotalRemaining,
}

/// Unit the budget is measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Seconds of wall-clock time
    WallTime,
    /// Number of search iterations (playouts)
    SimulationCount,
}

/// Game-phase boundaries as percentages of the board scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBounds {
    pub fuseki_end: u32,
    pub yose_start: u32,
}

impl Default for PhaseBounds {
    fn default() -> Self {
        Self {
            fuseki_end: 20,
            yose_start: 40,
        }
    }
}

impl PhaseBounds {
    /// Convert the percentage boundaries into move numbers
    ///
    /// Returns `(fuseki_end_move, yose_start_move)`.
    pub fn to_moves(self, board_scale: u32) -> (u32, u32) {
        let scale = u64::from(board_scale);
        let fuseki = u64::from(self.fuseki_end) * scale / 100;
        let yose = u64::from(self.yose_start) * scale / 100;
        (
            u32::try_from(fuseki).unwrap_or(u32::MAX),
            u32::try_from(yose).unwrap_or(u32::MAX),
        )
    }
}

/// Queries about the game in progress, answered by the board owner
pub trait GameProgress {
    /// Heuristic estimate of the plies still to be played (must be positive)
    fn estimated_moves_left(&self) -> u32;
    /// Number of playable intersections, e.g. 361 on 19x19
    fn board_scale(&self) -> u32;
    /// Plies played so far
    fn moves_played(&self) -> u32;
}

/// Plain snapshot of the game progress queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    pub moves_left: u32,
    pub board_scale: u32,
    pub moves_played: u32,
}

impl GameProgress for GameSnapshot {
    fn estimated_moves_left(&self) -> u32 {
        self.moves_left
    }

    fn board_scale(&self) -> u32 {
        self.board_scale
    }

    fn moves_played(&self) -> u32 {
        self.moves_played
    }
}

/// Per-move working budget derived from the control record (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAllotment {
    /// Most time this move may consume
    pub max_time: f64,
    /// Time this move should ideally consume
    pub recommended_time: f64,
}

/// Stop thresholds handed to the search for one move
///
/// `Copy` and free of interior mutability, so every worker can hold its own
/// copy for the duration of the move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopThresholds {
    /// Iteration-count targets; `desired == worst` for count-based control
    Playouts { desired: u64, worst: u64 },
    /// Absolute wall-clock deadlines in seconds, possibly already past
    Deadline { desired: f64, worst: f64 },
}

/// Outcome of polling the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopVerdict {
    Continue,
    /// Soft target reached, stop when the search is settled
    Desired,
    /// Hard limit reached, stop now
    Worst,
}

impl StopThresholds {
    /// Poll the thresholds against the current time or playout count
    ///
    /// Deadlines that already lie in the past simply report `Worst`.
    pub fn verdict(&self, now: f64, playouts: u64) -> StopVerdict {
        match *self {
            StopThresholds::Playouts { desired, worst } => {
                if playouts >= worst {
                    StopVerdict::Worst
                } else if playouts >= desired {
                    StopVerdict::Desired
                } else {
                    StopVerdict::Continue
                }
            }
            StopThresholds::Deadline { desired, worst } => {
                if now >= worst {
                    StopVerdict::Worst
                } else if now >= desired {
                    StopVerdict::Desired
                } else {
                    StopVerdict::Continue
                }
            }
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            StopThresholds::Playouts { .. } => Dimension::SimulationCount,
            StopThresholds::Deadline { .. } => Dimension::WallTime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bounds_to_moves() {
        let bounds = PhaseBounds {
            fuseki_end: 20,
            yose_start: 60,
        };
        assert_eq!(bounds.to_moves(50), (10, 30));
        assert_eq!(PhaseBounds::default().to_moves(361), (72, 144));
    }

    #[test]
    fn test_phase_bounds_saturate_on_huge_percentages() {
        let bounds = PhaseBounds {
            fuseki_end: u32::MAX,
            yose_start: u32::MAX,
        };
        assert_eq!(bounds.to_moves(361), (u32::MAX, u32::MAX));
    }

    #[test]
    fn test_deadline_verdict() {
        let stop = StopThresholds::Deadline {
            desired: 10.0,
            worst: 12.0,
        };
        assert_eq!(stop.verdict(9.0, 0), StopVerdict::Continue);
        assert_eq!(stop.verdict(10.0, 0), StopVerdict::Desired);
        assert_eq!(stop.verdict(12.5, 0), StopVerdict::Worst);
    }

    #[test]
    fn test_playouts_verdict_ignores_clock() {
        let stop = StopThresholds::Playouts {
            desired: 100,
            worst: 100,
        };
        assert_eq!(stop.verdict(1e12, 99), StopVerdict::Continue);
        assert_eq!(stop.verdict(0.0, 100), StopVerdict::Worst);
        assert_eq!(stop.dimension(), Dimension::SimulationCount);
    }
}
