//! Headless demo -- plays a scripted session on the default level and prints
//! the last frame as ASCII.
//!
//! Run with:
//!   cargo run --example headless_run -p tilefall-engine [-- config.json]
//!
//! Set `RUST_LOG=debug` to see spawns, shots and kills.

use anyhow::Context;
use tilefall_engine::prelude::*;

// ---------------------------------------------------------------------------
// ASCII sink
// ---------------------------------------------------------------------------

/// Rasterizes each draw request's top-left tile cell into a character grid.
struct AsciiSink {
    tile: i32,
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl AsciiSink {
    fn new(map: &TileMap) -> Self {
        Self {
            tile: map.tile_size(),
            width: map.width(),
            height: map.height(),
            cells: vec!['.'; map.width() * map.height()],
        }
    }

    fn begin_frame(&mut self) {
        self.cells.fill('.');
    }

    fn frame(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RenderSink for AsciiSink {
    fn draw(&mut self, visual: Visual, x: i32, y: i32, _size: i32) {
        let (cx, cy) = (x.div_euclid(self.tile), y.div_euclid(self.tile));
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return;
        }
        let glyph = match visual {
            Visual::Tile => '#',
            Visual::Player => '@',
            Visual::Enemy => 'E',
            Visual::Bullet => '*',
            Visual::Block => 'B',
            Visual::Bar => '=',
        };
        self.cells[cy as usize * self.width + cx as usize] = glyph;
    }
}

// ---------------------------------------------------------------------------
// Scripted input
// ---------------------------------------------------------------------------

/// Walk right, jump, turn around and shoot.
fn script(tick: u64, keys: &KeyBindings) -> Vec<InputEvent> {
    match tick {
        40 => vec![InputEvent::Pressed(keys.right)],
        70 => vec![InputEvent::Pressed(keys.jump)],
        75 => vec![InputEvent::Released(keys.jump)],
        90 => vec![InputEvent::Released(keys.right), InputEvent::Pressed(keys.left)],
        95 => vec![InputEvent::Released(keys.left), InputEvent::Pressed(keys.fire)],
        180 => vec![InputEvent::Released(keys.fire)],
        240 => vec![InputEvent::Quit],
        _ => Vec::new(),
    }
}

fn load_config() -> Result<GameConfig, anyhow::Error> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            GameConfig::from_json_str(&json).with_context(|| format!("loading {path}"))
        }
        None => Ok(GameConfig::default()),
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;
    let keys = config.keys;
    let mut game = Game::with_default_level(config)?;
    game.spawn_player(40, 300)?;
    game.spawn_enemy(20, 320, Facing::RIGHT)?;
    game.spawn_enemy(300, 100, Facing::LEFT)?;
    game.spawn_bar(10, 10)?;

    let mut sink = AsciiSink::new(game.map());
    let mut recorder = InputRecorder::new(&game, 30)?;
    let mut last_frame = String::new();
    loop {
        sink.begin_frame();
        let events = script(game.clock().current() + 1, &keys);
        let outcome = game.tick(&events, &mut sink)?;
        recorder.record(&game, &events)?;
        if outcome.is_quit() {
            break;
        }
        last_frame = sink.frame();
    }

    println!("{last_frame}");
    let log = recorder.finish();
    println!(
        "recorded {} ticks, {} log entries, final state {}",
        log.total_ticks,
        log.entries.len(),
        game.state_hash()?
    );

    let summary = game.shutdown();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
