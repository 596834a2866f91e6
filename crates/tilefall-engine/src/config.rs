//! Game configuration.
//!
//! Every tunable lives in [`GameConfig`]. Defaults reproduce the prototype
//! level's feel (20 px tiles, 400 px square world, half-pixel gravity). A
//! config can be loaded from JSON; absent fields keep their defaults.
//!
//! ```
//! use tilefall_engine::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "player": { "speed": 6 } }"#).unwrap();
//! assert_eq!(config.player.speed, 6);
//! assert_eq!(config.tile_size, 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::input::Key;

/// Errors from loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// WorldBounds
// ---------------------------------------------------------------------------

/// The rectangle entities are kept inside, independent of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    /// Whether `(x, y)` is inside: `0 < x <= width` and `0 < y <= height`.
    ///
    /// The origin edges are exclusive, the far edges inclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x <= self.width && y <= self.height
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-entity tunables
// ---------------------------------------------------------------------------

/// The controllable character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: i32,
    /// Horizontal pixels per tick while a direction key is held.
    pub speed: i32,
    /// Vertical velocity applied on jump (negative is up).
    pub jump_impulse: f32,
    /// Added to vertical velocity after every tick's movement.
    pub gravity: f32,
    /// Fire at most on ticks divisible by this.
    pub fire_interval: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: 19,
            speed: 4,
            jump_impulse: -12.0,
            gravity: 0.5,
            fire_interval: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: i32,
    pub damage: i32,
    pub size: i32,
    /// Offset from the owner's position on both axes at spawn.
    pub spawn_offset: i32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 6,
            damage: 1,
            size: 4,
            spawn_offset: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: i32,
    pub hit_points: i32,
    pub size: i32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 4,
            hit_points: 5,
            size: 20,
        }
    }
}

/// Raw key identifiers bound to the four gameplay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
    pub fire: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: Key::from_char('a'),
            right: Key::from_char('d'),
            jump: Key::from_char('w'),
            fire: Key::from_char(' '),
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of one tile in pixels.
    pub tile_size: i32,
    pub world: WorldBounds,
    pub player: PlayerConfig,
    pub bullet: BulletConfig,
    pub enemy: EnemyConfig,
    pub keys: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 20,
            world: WorldBounds::default(),
            player: PlayerConfig::default(),
            bullet: BulletConfig::default(),
            enemy: EnemyConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tile_size", self.tile_size),
            ("world.width", self.world.width),
            ("world.height", self.world.height),
            ("player.size", self.player.size),
            ("bullet.size", self.bullet.size),
            ("enemy.size", self.enemy.size),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| *v <= 0) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if self.player.fire_interval == 0 {
            return Err(ConfigError::Invalid(
                "player.fire_interval must be at least 1".to_owned(),
            ));
        }
        if !self.player.gravity.is_finite() || !self.player.jump_impulse.is_finite() {
            return Err(ConfigError::Invalid(
                "player.gravity and player.jump_impulse must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}
