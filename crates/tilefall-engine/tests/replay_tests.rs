//! Integration tests for input recording and deterministic replay.

use tilefall_engine::prelude::*;
use tilefall_engine::replay::LogEntry;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Player facing a column of enemies on the default level.
fn arena() -> Game {
    let mut game = Game::with_default_level(GameConfig::default()).unwrap();
    game.spawn_player(40, 300).unwrap();
    for i in 0..3 {
        game.spawn_enemy(120 + i * 40, 330, Facing::RIGHT).unwrap();
    }
    game.spawn_bar(10, 10).unwrap();
    game
}

fn scripted(tick: u64, keys: &KeyBindings) -> Vec<InputEvent> {
    match tick {
        5 => vec![InputEvent::Pressed(keys.fire)],
        20 => vec![InputEvent::Pressed(keys.right)],
        45 => vec![InputEvent::Pressed(keys.jump)],
        50 => vec![InputEvent::Released(keys.jump), InputEvent::Released(keys.right)],
        90 => vec![InputEvent::Pressed(keys.left)],
        120 => vec![InputEvent::Released(keys.left), InputEvent::Released(keys.fire)],
        _ => Vec::new(),
    }
}

fn record(game: &mut Game, ticks: u64, interval: u64) -> InputLog {
    let keys = game.config().keys;
    let mut recorder = InputRecorder::new(game, interval).unwrap();
    for _ in 0..ticks {
        let events = scripted(game.clock().current() + 1, &keys);
        game.tick(&events, &mut NullSink).unwrap();
        recorder.record(game, &events).unwrap();
    }
    recorder.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn replay_reproduces_recorded_session() {
    let mut original = arena();
    let log = record(&mut original, 200, 10);
    assert!(original.summary().shots_fired > 0);

    let mut again = arena();
    let result = replay(&mut again, &log, &mut NullSink).unwrap();
    assert_eq!(result.ticks_replayed, 200);
    assert!(result.first_divergence.is_none());
    assert!(!result.quit);
    assert_eq!(result.final_hash, original.state_hash().unwrap());
    assert_eq!(again.summary(), original.summary());
}

#[test]
fn log_survives_json_round_trip() {
    let mut game = arena();
    let log = record(&mut game, 60, 15);
    let json = serde_json::to_string(&log).unwrap();
    let parsed: InputLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, log);

    let result = replay(&mut arena(), &parsed, &mut NullSink).unwrap();
    assert_eq!(result.final_hash, game.state_hash().unwrap());
}

#[test]
fn different_inputs_diverge_at_a_checkpoint() {
    let mut game = arena();
    let mut log = record(&mut game, 100, 10);
    // Drop the walk-right press: the player never moves right.
    log.entries.retain(|e| !matches!(e, LogEntry::Input { tick: 20, .. }));

    let result = replay(&mut arena(), &log, &mut NullSink).unwrap();
    let divergence = result.first_divergence.expect("inputs changed, state should too");
    assert_eq!(divergence.tick, 20);
    assert_ne!(divergence.expected_hash, divergence.actual_hash);
}

#[test]
fn recording_can_start_mid_session() {
    let mut game = arena();
    game.run_ticks(25, &mut NullSink).unwrap();
    let log = record(&mut game, 30, 5);
    assert_eq!(log.start_tick, 25);

    let mut again = arena();
    again.run_ticks(25, &mut NullSink).unwrap();
    let result = replay(&mut again, &log, &mut NullSink).unwrap();
    assert!(result.first_divergence.is_none());
    assert_eq!(again.clock().current(), 55);
}
