//! Fuseki/yose pacing tests

use super::{assert_close, game, manual_manager};
use crate::{
    GameSnapshot, ManualClock, PhaseBounds, TimeControlState, TimeManager, TimeParameters,
};

fn total_main_time(seconds: u32) -> TimeControlState {
    let mut ti = TimeControlState::default();
    ti.apply_settings(seconds, 0, 0, 0);
    ti
}

#[test]
fn test_small_board_pacing_never_exceeds_max() {
    // Board scale 50 maps 20% / 60% to moves 10 and 30
    let tm = TimeManager::new(
        ManualClock::new(0.0),
        TimeParameters::default(),
        PhaseBounds {
            fuseki_end: 20,
            yose_start: 60,
        },
    );

    for moves_played in 0..60 {
        let mut ti = total_main_time(60);
        let progress = GameSnapshot {
            moves_left: 20,
            board_scale: 50,
            moves_played,
        };
        let plan = tm.plan(&mut ti, &progress).wall.unwrap();
        assert_close(plan.allotment.recommended_time, 3.0);
        // 60 / 30 (min moves left) never beats 3s: desired stays put
        assert_close(plan.desired_time, 3.0);
        assert_close(plan.worst_time, 9.0);
        assert!(plan.worst_time <= plan.allotment.max_time);
    }
}

#[test]
fn test_fuseki_ramps_toward_longest_time() {
    let (tm, _clock) = manual_manager(0.0);
    // Default bounds on 19x19: fuseki ends at move 72, yose starts at 144
    let desired_at = |moves_played: u32| {
        let mut ti = total_main_time(600);
        tm.plan(&mut ti, &game(150, moves_played)).wall.unwrap().desired_time
    };

    // Move 0: no progress through fuseki yet, base recommendation
    assert_close(desired_at(0), 4.0);

    // Move 36: halfway between 4s and 600 / (150 - 54)
    assert_close(desired_at(36), 4.0 + (600.0 / 96.0 - 4.0) * 36.0 / 72.0);

    // Throughout fuseki we spend more than the base but never more than
    // main time can sustain until yose
    for moves_played in 1..72 {
        let own_moves_to_yose = (144 - moves_played) / 2;
        let longest = 600.0 / f64::from(150 - own_moves_to_yose);
        let desired = desired_at(moves_played);
        assert!(desired > 4.0, "no extra time at move {moves_played}");
        assert!(desired <= longest, "overspent at move {moves_played}");
    }
}

#[test]
fn test_middle_game_uses_longest_sustainable_time() {
    let (tm, _clock) = manual_manager(0.0);
    let mut ti = total_main_time(600);
    // Move 100: (144 - 100) / 2 = 22 own moves to yose, 128 left after that
    let plan = tm.plan(&mut ti, &game(150, 100)).wall.unwrap();
    assert_close(plan.desired_time, 600.0 / 128.0);
    assert_close(plan.worst_time, 3.0 * 600.0 / 128.0);
}

#[test]
fn test_yose_keeps_base_recommendation() {
    let (tm, _clock) = manual_manager(0.0);
    let mut ti = total_main_time(600);
    let plan = tm.plan(&mut ti, &game(150, 144)).wall.unwrap();
    assert_close(plan.desired_time, 4.0);
}

#[test]
fn test_min_moves_left_floors_yose_estimate() {
    let (tm, _clock) = manual_manager(0.0);
    let mut ti = total_main_time(600);
    // 40 - 22 = 18 is floored to 30
    let plan = tm.plan(&mut ti, &game(40, 100)).wall.unwrap();
    assert_close(plan.allotment.recommended_time, 15.0);
    // 600 / 30 = 20 beats 15
    assert_close(plan.desired_time, 20.0);
    assert_close(plan.worst_time, 60.0);
}

#[test]
fn test_worst_time_clamped_to_max_time() {
    let (tm, _clock) = manual_manager(0.0);
    let mut ti: TimeControlState = "10".parse().unwrap();
    // Per-move 10s: 3x extension must not pass the allotment
    let plan = tm.plan(&mut ti, &game(100, 50)).wall.unwrap();
    assert_close(plan.allotment.max_time, 10.0);
    assert_close(plan.worst_time, 10.0);
    assert!(plan.desired_time <= plan.worst_time);
}

#[test]
#[should_panic(expected = "must come before yose start")]
fn test_inverted_phase_bounds_panic() {
    let tm = TimeManager::new(
        ManualClock::new(0.0),
        TimeParameters::default(),
        PhaseBounds {
            fuseki_end: 50,
            yose_start: 30,
        },
    );
    let mut ti = total_main_time(600);
    tm.plan(&mut ti, &game(100, 10));
}
