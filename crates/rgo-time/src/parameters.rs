//! Tunable parameters for time management

/// Time management tunable parameters
///
/// All fields are primitive so the struct stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TimeParameters {
    /// Baseline lag reserve in seconds, kept back on every move
    pub max_net_lag: f64, // Default: 2.0
    /// Share of a byoyomi period kept as safety margin when cutting it close (%)
    pub reserved_byoyomi_percent: f64, // Default: 15

    /// Worst time may be this multiple of desired time in main time
    pub max_main_time_extension: f64, // Default: 3.0
    /// Worst time may be this multiple of recommended time in byoyomi
    pub max_byoyomi_time_extension: f64, // Default: 1.1

    /// Floor for the moves-left count used by pre-yose pacing
    pub min_moves_left: u32, // Default: 30

    /// Main time at most this much above a byoyomi period counts as byoyomi
    pub byoyomi_tolerance: f64, // Default: 0.001
}

impl Default for TimeParameters {
    fn default() -> Self {
        Self {
            max_net_lag: constants::DEFAULT_MAX_NET_LAG,
            reserved_byoyomi_percent: constants::DEFAULT_RESERVED_BYOYOMI_PERCENT,
            max_main_time_extension: constants::DEFAULT_MAX_MAIN_TIME_EXTENSION,
            max_byoyomi_time_extension: constants::DEFAULT_MAX_BYOYOMI_TIME_EXTENSION,
            min_moves_left: constants::DEFAULT_MIN_MOVES_LEFT,
            byoyomi_tolerance: 0.001,
        }
    }
}

impl TimeParameters {
    /// Safety margin carved out of one byoyomi period
    #[inline]
    pub fn byoyomi_safety_margin(&self, byoyomi_time: f64) -> f64 {
        self.reserved_byoyomi_percent * byoyomi_time / 100.0
    }

    /// Re-run builder validation on an already constructed value
    ///
    /// Used for parameters that arrive through deserialization.
    pub fn validate(self) -> Result<Self, TimeParameterError> {
        Ok(TimeParametersBuilder::new()
            .max_net_lag(self.max_net_lag)?
            .reserved_byoyomi_percent(self.reserved_byoyomi_percent)?
            .max_main_time_extension(self.max_main_time_extension)?
            .max_byoyomi_time_extension(self.max_byoyomi_time_extension)?
            .min_moves_left(self.min_moves_left)?
            .byoyomi_tolerance(self.byoyomi_tolerance)?
            .build())
    }
}

/// Builder for TimeParameters with validation
pub struct TimeParametersBuilder {
    params: TimeParameters,
}

/// Validation errors for time parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParameterError {
    #[error("Net lag must be between {min} and {max}, got {value}")]
    NetLag { value: f64, min: f64, max: f64 },
    #[error("Reserved byoyomi percent must be between {min} and {max}, got {value}")]
    ReservedByoyomiPercent { value: f64, min: f64, max: f64 },
    #[error("Main time extension must be between {min} and {max}, got {value}")]
    MainTimeExtension { value: f64, min: f64, max: f64 },
    #[error("Byoyomi time extension must be above {min} and below {max}, got {value}")]
    ByoyomiTimeExtension { value: f64, min: f64, max: f64 },
    #[error("Minimum moves left must be between {min} and {max}, got {value}")]
    MinMovesLeft { value: u32, min: u32, max: u32 },
    #[error("Byoyomi tolerance must be between {min} and {max}, got {value}")]
    ByoyomiTolerance { value: f64, min: f64, max: f64 },
}

/// Time management constants
pub mod constants {
    // Default values (mirrored from Default impl)
    pub const DEFAULT_MAX_NET_LAG: f64 = 2.0;
    pub const DEFAULT_RESERVED_BYOYOMI_PERCENT: f64 = 15.0;
    pub const DEFAULT_MAX_MAIN_TIME_EXTENSION: f64 = 3.0;
    pub const DEFAULT_MAX_BYOYOMI_TIME_EXTENSION: f64 = 1.1;
    pub const DEFAULT_MIN_MOVES_LEFT: u32 = 30;

    /// Slack allowed when checking recommended <= max after derivation
    pub const ALLOTMENT_EPSILON: f64 = 0.001;

    // Validation ranges
    pub const MIN_NET_LAG: f64 = 0.0;
    pub const MAX_NET_LAG: f64 = 60.0;
    pub const MIN_RESERVED_BYOYOMI_PERCENT: f64 = 0.0;
    pub const MAX_RESERVED_BYOYOMI_PERCENT: f64 = 50.0;
    pub const MIN_MAIN_TIME_EXTENSION: f64 = 1.0;
    pub const MAX_MAIN_TIME_EXTENSION: f64 = 10.0;
    // Exclusive bounds: desired = recommended * (2 - ext) must stay positive
    pub const MIN_BYOYOMI_TIME_EXTENSION: f64 = 1.0;
    pub const MAX_BYOYOMI_TIME_EXTENSION: f64 = 2.0;
    pub const MIN_MIN_MOVES_LEFT: u32 = 1;
    pub const MAX_MIN_MOVES_LEFT: u32 = 400;
    pub const MIN_BYOYOMI_TOLERANCE: f64 = 0.0;
    pub const MAX_BYOYOMI_TOLERANCE: f64 = 1.0;
}

impl TimeParametersBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            params: TimeParameters::default(),
        }
    }

    /// Set the baseline lag reserve in seconds
    pub fn max_net_lag(mut self, seconds: f64) -> Result<Self, TimeParameterError> {
        if !(constants::MIN_NET_LAG..=constants::MAX_NET_LAG).contains(&seconds) {
            return Err(TimeParameterError::NetLag {
                value: seconds,
                min: constants::MIN_NET_LAG,
                max: constants::MAX_NET_LAG,
            });
        }
        self.params.max_net_lag = seconds;
        Ok(self)
    }

    /// Set the byoyomi safety reserve (percent of one period)
    pub fn reserved_byoyomi_percent(mut self, pct: f64) -> Result<Self, TimeParameterError> {
        if !(constants::MIN_RESERVED_BYOYOMI_PERCENT..=constants::MAX_RESERVED_BYOYOMI_PERCENT)
            .contains(&pct)
        {
            return Err(TimeParameterError::ReservedByoyomiPercent {
                value: pct,
                min: constants::MIN_RESERVED_BYOYOMI_PERCENT,
                max: constants::MAX_RESERVED_BYOYOMI_PERCENT,
            });
        }
        self.params.reserved_byoyomi_percent = pct;
        Ok(self)
    }

    /// Set the main-time overrun multiplier (1.0 - 10.0)
    pub fn max_main_time_extension(mut self, factor: f64) -> Result<Self, TimeParameterError> {
        if !(constants::MIN_MAIN_TIME_EXTENSION..=constants::MAX_MAIN_TIME_EXTENSION)
            .contains(&factor)
        {
            return Err(TimeParameterError::MainTimeExtension {
                value: factor,
                min: constants::MIN_MAIN_TIME_EXTENSION,
                max: constants::MAX_MAIN_TIME_EXTENSION,
            });
        }
        self.params.max_main_time_extension = factor;
        Ok(self)
    }

    /// Set the byoyomi overrun multiplier (strictly between 1.0 and 2.0)
    pub fn max_byoyomi_time_extension(mut self, factor: f64) -> Result<Self, TimeParameterError> {
        if !(factor > constants::MIN_BYOYOMI_TIME_EXTENSION
            && factor < constants::MAX_BYOYOMI_TIME_EXTENSION)
        {
            return Err(TimeParameterError::ByoyomiTimeExtension {
                value: factor,
                min: constants::MIN_BYOYOMI_TIME_EXTENSION,
                max: constants::MAX_BYOYOMI_TIME_EXTENSION,
            });
        }
        self.params.max_byoyomi_time_extension = factor;
        Ok(self)
    }

    /// Set the floor for moves left at yose start
    pub fn min_moves_left(mut self, moves: u32) -> Result<Self, TimeParameterError> {
        if !(constants::MIN_MIN_MOVES_LEFT..=constants::MAX_MIN_MOVES_LEFT).contains(&moves) {
            return Err(TimeParameterError::MinMovesLeft {
                value: moves,
                min: constants::MIN_MIN_MOVES_LEFT,
                max: constants::MAX_MIN_MOVES_LEFT,
            });
        }
        self.params.min_moves_left = moves;
        Ok(self)
    }

    /// Set the main-time vs byoyomi comparison tolerance in seconds
    pub fn byoyomi_tolerance(mut self, seconds: f64) -> Result<Self, TimeParameterError> {
        if !(constants::MIN_BYOYOMI_TOLERANCE..=constants::MAX_BYOYOMI_TOLERANCE).contains(&seconds)
        {
            return Err(TimeParameterError::ByoyomiTolerance {
                value: seconds,
                min: constants::MIN_BYOYOMI_TOLERANCE,
                max: constants::MAX_BYOYOMI_TOLERANCE,
            });
        }
        self.params.byoyomi_tolerance = seconds;
        Ok(self)
    }

    /// Build the final TimeParameters
    pub fn build(self) -> TimeParameters {
        self.params
    }
}

impl Default for TimeParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}
