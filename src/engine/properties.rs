//! Behavioural properties of the session engine

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use super::*;
use crate::clock::ManualClock;
use crate::input::ClickData;
use crate::settings::Settings;

const T0: u64 = 1_700_000_000_000;

fn engine_with(secs: u32) -> (GameEngine<ManualClock>, ManualClock, Rc<RefCell<Vec<GameEvent>>>) {
    let clock = ManualClock::new(T0);
    let settings = Settings {
        game_duration: secs,
        ..Default::default()
    };
    let mut engine = GameEngine::with_settings(clock.clone(), settings);
    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let events = events.clone();
        engine.subscribe(move |e| events.borrow_mut().push(e.clone()));
    }
    (engine, clock, events)
}

/// Scores carried by the last `Update` before the single `SessionEnded`
fn check_end_matches_last_update(events: &[GameEvent]) {
    let ended: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind() == EventKind::SessionEnded)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(ended.len(), 1, "exactly one session-ended");

    let end_scores = match &events[ended[0]] {
        GameEvent::SessionEnded { scores, .. } => *scores,
        _ => unreachable!(),
    };
    let last_update = events[..ended[0]].iter().rev().find_map(|e| match e {
        GameEvent::Update { scores, .. } => Some(*scores),
        _ => None,
    });
    assert_eq!(last_update, Some(end_scores));
}

#[test]
fn three_quick_taps_decay_to_zero() {
    let (mut engine, clock, _) = engine_with(5);
    engine.start_single_player().unwrap();

    for _ in 0..3 {
        engine.handle_click(Participant::Single, ClickData::default());
        clock.advance(100);
        engine.poll();
    }
    assert_eq!(engine.get_state().current_tps, 3);

    let mut readings = Vec::new();
    for _ in 0..120 {
        clock.advance(10);
        engine.poll();
        readings.push(engine.get_state().current_tps);
    }

    // Non-increasing without further taps, reaching zero
    assert!(readings.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(readings.last(), Some(&0));
    assert_eq!(engine.get_state().tps_level, 1);
    assert_eq!(engine.statistics().highest_tps, 3);
}

#[test]
fn dual_player_five_vs_three() {
    let (mut engine, clock, events) = engine_with(30);
    engine.start_dual_player().unwrap();

    use Participant::{Player1 as P1, Player2 as P2};
    for who in [P1, P2, P1, P1, P2, P1, P2, P1] {
        engine.handle_click(who, ClickData::default());
        clock.advance(120);
        engine.poll();
    }
    engine.exit_game();

    let records = engine.take_records();
    assert_eq!(records[0].scores.player1, 5);
    assert_eq!(records[0].scores.player2, 3);
    assert_eq!(
        records[0].outcome(),
        Outcome::Winner {
            participant: Participant::Player1
        }
    );
    check_end_matches_last_update(&events.borrow());
}

#[test]
fn exit_twice_is_idempotent() {
    let (mut engine, _clock, events) = engine_with(30);
    engine.start_single_player().unwrap();
    engine.handle_click(Participant::Single, ClickData::default());

    engine.exit_game();
    let scores = engine.get_state().scores;
    engine.exit_game();

    let events = events.borrow();
    let count = |k| events.iter().filter(|e| e.kind() == k).count();
    assert_eq!(count(EventKind::SessionEnded), 1);
    assert_eq!(count(EventKind::SessionExited), 2);
    assert_eq!(engine.get_state().scores, scores);
    assert_eq!(engine.take_records().len(), 1);
}

#[test]
fn reset_snapshot_is_fresh() {
    let (mut engine, clock, _) = engine_with(17);
    engine.start_single_player().unwrap();
    engine.handle_click(Participant::Single, ClickData::default());
    clock.advance(2_000);
    engine.poll();

    engine.reset_game();
    let state = engine.get_state();
    assert_eq!(state.scores, Scores::default());
    assert_eq!(state.time_left, state.settings.game_duration);
    assert_eq!(state.time_left, 17);
    assert!(!state.is_playing);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn constant_rate_converges(rate in 1u32..=20) {
        let (mut engine, clock, _) = engine_with(30);
        engine.start_single_player().unwrap();

        let period = 1000.0 / rate as f64;
        let mut next_tap = 0u64;
        let mut k = 0u64;
        for elapsed in 0..=2_500u64 {
            clock.set(T0 + elapsed);
            while next_tap <= elapsed {
                engine.handle_click(Participant::Single, ClickData::default());
                k += 1;
                next_tap = (k as f64 * period).round() as u64;
            }
            engine.poll();

            if elapsed >= 1_100 {
                let tps = engine.get_state().current_tps;
                prop_assert!(
                    tps + 1 >= rate && tps <= rate + 1,
                    "rate {} read {} at {}ms", rate, tps, elapsed
                );
            }
        }
    }

    #[test]
    fn scores_count_every_valid_tap(
        taps in prop::collection::vec((0u8..3, 0u64..50), 0..200)
    ) {
        let (mut engine, clock, _) = engine_with(30);
        engine.start_dual_player().unwrap();

        let mut expected = Scores::default();
        for (who, gap) in taps {
            let participant = match who {
                0 => Participant::Player1,
                1 => Participant::Player2,
                _ => Participant::Single,
            };
            let result = engine.handle_click(participant, ClickData::default());
            if participant == Participant::Single {
                prop_assert_eq!(result, None);
            } else {
                prop_assert_eq!(result, Some(expected.increment(participant)));
            }
            clock.advance(gap);
            engine.poll();
        }

        let state = engine.get_state();
        prop_assert_eq!(state.scores, expected);
        prop_assert_eq!(state.statistics.total_clicks, expected.total() as u64);
    }

    #[test]
    fn time_left_tracks_whole_seconds(
        secs in 1u32..=8,
        steps in prop::collection::vec(1u64..700, 1..60)
    ) {
        let (mut engine, clock, _) = engine_with(secs);
        engine.start_single_player().unwrap();

        let mut elapsed = 0u64;
        let mut previous = secs;
        for step in steps {
            clock.advance(step);
            elapsed += step;
            engine.poll();

            let time_left = engine.get_state().time_left;
            let expected = secs.saturating_sub((elapsed / 1000) as u32);
            prop_assert_eq!(time_left, expected);
            prop_assert!(time_left <= previous);
            previous = time_left;
        }
        if elapsed >= secs as u64 * 1000 {
            prop_assert_eq!(engine.phase(), SessionPhase::Ended);
        }
    }

    #[test]
    fn end_reports_last_broadcast_scores(
        taps in prop::collection::vec((any::<bool>(), 0u64..300), 1..80),
        exit_early in any::<bool>()
    ) {
        let (mut engine, clock, events) = engine_with(3);
        engine.start_dual_player().unwrap();

        for (first, gap) in taps {
            if !engine.get_state().is_playing {
                break;
            }
            let who = if first { Participant::Player1 } else { Participant::Player2 };
            engine.handle_click(who, ClickData::default());
            clock.advance(gap);
            engine.poll();
        }
        if exit_early {
            engine.exit_game();
        } else {
            clock.advance(5_000);
            engine.poll();
        }

        check_end_matches_last_update(&events.borrow());
        prop_assert_eq!(engine.active_timers(), 0);
    }
}
