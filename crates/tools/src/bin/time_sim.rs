/// Time budget simulator
///
/// Plays one side of a game against a manual clock and prints, for each of
/// our moves, the budget the time manager handed out and the time spent.
///
/// Usage:
///   # 10 minutes sudden death on 19x19
///   time_sim --main 600
///
///   # Japanese byoyomi, 5 x 30s, controller reports like a GTP server
///   time_sim --main 300 --byoyomi 30 --stones 1 --periods 5 --report-time-left
///
///   # Textual spec, custom tunables
///   time_sim --spec _=90000 --config time.toml
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

use rgo_time::{
    Budget, Clock, GameProgress, ManualClock, Period, PhaseBounds, StopThresholds, TimeControlState,
    TimeManager, TimeParameters,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(about = "Simulate per-move time budgets over one game")]
struct Cli {
    /// Textual time spec (`5`, `_600`, `=5000`, `_=90000`)
    #[arg(long, conflicts_with_all = ["main", "byoyomi", "stones", "periods"])]
    spec: Option<String>,

    /// Main time in seconds (GTP time_settings)
    #[arg(long, default_value_t = 600)]
    main: u32,

    /// Byoyomi time in seconds per period or block
    #[arg(long, default_value_t = 0)]
    byoyomi: u32,

    /// Stones per byoyomi block
    #[arg(long, default_value_t = 0)]
    stones: u32,

    /// Number of byoyomi periods
    #[arg(long, default_value_t = 0)]
    periods: u32,

    /// Board size (edge length)
    #[arg(long, default_value_t = 19)]
    board_size: u32,

    /// Game length in plies (default: two thirds of the intersections)
    #[arg(long)]
    moves: Option<u32>,

    /// Fuseki end, percent of the board scale
    #[arg(long, default_value_t = 20)]
    fuseki_end: u32,

    /// Yose start, percent of the board scale
    #[arg(long, default_value_t = 40)]
    yose_start: u32,

    /// Maximum random extra lag per move in seconds
    #[arg(long, default_value_t = 0.5)]
    lag: f64,

    /// PRNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// TOML file with time management tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report remaining time every move like a GTP controller
    #[arg(long)]
    report_time_left: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct MoveLog {
    ply: u32,
    moves_left: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommended_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    worst_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    net_lag: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    playouts: Option<u64>,
    control: String,
    forfeit: bool,
}

// ---------------------------------------------------------------------------
// Game progress
// ---------------------------------------------------------------------------

/// Linear moves-left estimate over a fixed game length
struct LinearGame {
    board_scale: u32,
    game_length: u32,
    moves_played: u32,
    min_moves_left: u32,
}

impl GameProgress for LinearGame {
    fn estimated_moves_left(&self) -> u32 {
        // Our share of the remaining plies
        let remaining = self.game_length.saturating_sub(self.moves_played) / 2;
        remaining.max(self.min_moves_left)
    }

    fn board_scale(&self) -> u32 {
        self.board_scale
    }

    fn moves_played(&self) -> u32 {
        self.moves_played
    }
}

fn load_params(path: Option<&Path>) -> Result<TimeParameters> {
    let Some(path) = path else {
        return Ok(TimeParameters::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let params: TimeParameters =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    params.validate().with_context(|| format!("invalid parameters in {}", path.display()))
}

fn init_logging(debug: bool) {
    use std::io::Write;
    let log_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
    })
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

/// Out of time: main time gone and no byoyomi left to fall back on
fn out_of_time(state: &TimeControlState, configured_periods: u32) -> bool {
    if state.period != Period::TotalRemaining {
        return false;
    }
    match state.wall() {
        Some(wall) => {
            wall.main_time <= 0.0
                && (wall.byoyomi_time <= 0.0
                    || (configured_periods > 0 && wall.byoyomi_periods == 0))
        }
        None => false,
    }
}

/// GTP time_left arguments a controller would send for `referee`
fn time_left_args(referee: &TimeControlState) -> Option<(u32, u32)> {
    let wall = referee.wall()?;
    if wall.main_time > 0.0 {
        Some((wall.main_time.round() as u32, 0))
    } else {
        Some((wall.byoyomi_time.round() as u32, wall.byoyomi_periods.max(1)))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if !(cli.lag >= 0.0 && cli.lag.is_finite()) {
        bail!("--lag must be a non-negative number of seconds, got {}", cli.lag);
    }
    if cli.board_size == 0 {
        bail!("--board-size must be positive");
    }

    let params = load_params(cli.config.as_deref())?;
    let bounds = PhaseBounds {
        fuseki_end: cli.fuseki_end,
        yose_start: cli.yose_start,
    };
    let board_scale = cli.board_size * cli.board_size;
    let (fuseki_move, yose_move) = bounds.to_moves(board_scale);
    if fuseki_move >= yose_move {
        bail!("fuseki end (move {fuseki_move}) must come before yose start (move {yose_move})");
    }

    let mut state = match &cli.spec {
        Some(text) => text
            .parse::<TimeControlState>()
            .with_context(|| format!("invalid time spec {text:?}"))?,
        None => {
            let mut state = TimeControlState::default();
            state.apply_settings(cli.main, cli.byoyomi, cli.stones, cli.periods);
            state
        }
    };
    if !state.is_enabled() {
        bail!("time settings disable time control, nothing to simulate");
    }

    // Referee clock for the report mode; only meaningful for session budgets
    let mut referee = (cli.report_time_left
        && state.period == Period::TotalRemaining
        && matches!(state.budget, Budget::WallTime(_)))
    .then_some(state);
    if cli.report_time_left && referee.is_none() {
        log::warn!("--report-time-left ignored for {state}");
    }

    let clock = ManualClock::new(0.0);
    let tm = TimeManager::new(clock.clone(), params, bounds);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cli.seed);
    let game_length = cli.moves.unwrap_or(board_scale * 2 / 3);

    log::info!(
        "time_sim: control={state} board={}x{} plies={game_length} seed={}",
        cli.board_size,
        cli.board_size,
        cli.seed
    );

    let mut total_spent = 0.0;
    let mut our_moves = 0u32;
    // We play black: even plies are ours, the opponent's plies cost us nothing
    for ply in (0..game_length).step_by(2) {
        let game = LinearGame {
            board_scale,
            game_length,
            moves_played: ply,
            min_moves_left: params.min_moves_left,
        };

        // Opponent's move arrives, then the controller asks for ours
        tm.start_move_timer(&mut state);
        let lag = if cli.lag > 0.0 { rng.random_range(0.0..=cli.lag) } else { 0.0 };
        clock.advance(lag);

        let plan = tm.plan(&mut state, &game);
        let mut record = MoveLog {
            ply,
            moves_left: game.estimated_moves_left(),
            max_time: None,
            recommended_time: None,
            desired_time: None,
            worst_time: None,
            net_lag: None,
            spent: None,
            playouts: None,
            control: String::new(),
            forfeit: false,
        };

        match (plan.thresholds, plan.wall) {
            (StopThresholds::Playouts { desired, worst }, _) => {
                let playouts = if desired < worst {
                    rng.random_range(desired..=worst)
                } else {
                    desired
                };
                record.playouts = Some(playouts);
            }
            (StopThresholds::Deadline { desired, worst }, Some(wall)) => {
                let now = clock.now();
                let earliest = desired.max(now);
                let latest = worst.max(earliest);
                let stop = if earliest < latest {
                    rng.random_range(earliest..=latest)
                } else {
                    earliest
                };
                clock.set(stop);
                let spent = stop - wall.timer_start;
                total_spent += spent;

                match referee.as_mut() {
                    Some(referee) => {
                        referee.record_time_spent(spent);
                        record.forfeit = out_of_time(referee, cli.periods);
                        if let Some((time_left, stones_left)) = time_left_args(referee) {
                            if !record.forfeit {
                                state.apply_time_left(time_left, stones_left);
                            }
                        }
                    }
                    None => {
                        state.record_time_spent(spent);
                        record.forfeit = out_of_time(&state, cli.periods);
                    }
                }

                record.max_time = Some(wall.allotment.max_time);
                record.recommended_time = Some(wall.allotment.recommended_time);
                record.desired_time = Some(wall.desired_time);
                record.worst_time = Some(wall.worst_time);
                record.net_lag = Some(wall.net_lag);
                record.spent = Some(spent);
            }
            (StopThresholds::Deadline { .. }, None) => {
                bail!("wall-time thresholds without a wall-time breakdown at ply {ply}");
            }
        }

        record.control = referee.as_ref().unwrap_or(&state).to_string();
        our_moves += 1;
        println!("{}", serde_json::to_string(&record)?);

        if record.forfeit {
            log::warn!("lost on time at ply {ply}");
            break;
        }
    }

    log::info!("time_sim: {our_moves} moves, {total_spent:.2}s spent");
    Ok(())
}
