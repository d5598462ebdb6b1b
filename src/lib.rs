//! Tank Battle - A single-screen arcade tank duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tanks, bullets, walls, collisions)
//! - `game`: Orchestrator driving the fixed-order per-frame cycle
//! - `renderer`: Drawing contract plus a text-grid renderer
//! - `platform`: Input sources (keyboard state, scripted input)
//! - `logger`: Event sinks for game notifications
//! - `settings`: Data-driven tuning, loaded from JSON

pub mod game;
pub mod logger;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use logger::{EventSink, LogCategory, LogSink, MemorySink, NullSink};
pub use settings::{Difficulty, Settings, SettingsError};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants (defaults for `Settings`)
pub mod consts {
    /// Nominal frame duration in milliseconds (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    pub const TILE_SIZE: f32 = 32.0;
    pub const INTERIOR_WALLS: u32 = 20;

    /// Headquarters, positioned by its centre
    pub const BASE_CENTER: (f32, f32) = (400.0, 550.0);
    pub const BASE_SIZE: f32 = 40.0;

    /// Tank defaults
    pub const TANK_SIZE: f32 = 32.0;
    pub const TANK_MAX_HEALTH: i32 = 100;

    /// Player defaults
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 100.0);
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const PLAYER_SHOOT_COOLDOWN_MS: f32 = 500.0;
    pub const PLAYER_LIVES: u32 = 3;
    pub const PLAYER_RESPAWN_MS: f32 = 2000.0;
    pub const PLAYER_BULLET_SPEED: f32 = 6.0;
    pub const PLAYER_BULLET_DAMAGE: i32 = 25;

    /// Enemy defaults
    pub const ENEMY_SPAWN: (f32, f32) = (300.0, 200.0);
    pub const ENEMY_SPEED: f32 = 1.0;
    pub const ENEMY_SHOOT_COOLDOWN_MS: f32 = 1000.0;
    pub const ENEMY_ATTACK_RANGE: f32 = 150.0;
    pub const ENEMY_PATROL_TURN_MS: f32 = 2000.0;
    pub const ENEMY_PATROL_REPEATS: u32 = 2;
    pub const ENEMY_BULLET_SPEED: f32 = 3.0;
    pub const ENEMY_BULLET_DAMAGE: i32 = 100;

    /// Bullet defaults
    pub const BULLET_SIZE: f32 = 4.0;
    pub const BULLET_LIFETIME_MS: f32 = 3000.0;
}

/// An sRGB colour handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const YELLOW: Color = Color::rgb(0xf1, 0xc4, 0x0f);
    pub const RED: Color = Color::rgb(0xe7, 0x4c, 0x3c);

    /// Hex form, e.g. `#f1c40f`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
