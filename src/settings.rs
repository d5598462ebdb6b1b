//! Game settings
//!
//! One explicit struct per entity type, every field defaulted. Settings are
//! plain data: the simulation reads them once when the world is built.
//! JSON files may be partial; missing fields fall back to the defaults.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Color;
use crate::consts::*;
use crate::sim::geom::{Direction, Rect};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings JSON")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Enemy difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" | "med" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on enemy movement speed
    pub fn speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    /// Multiplier on enemy shoot cooldown (lower fires faster)
    pub fn cooldown_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.7,
        }
    }

    /// Multiplier on enemy attack range
    pub fn range_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
        }
    }
}

/// Arena geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub width: f32,
    pub height: f32,
    /// Grid cell size for walls
    pub tile_size: f32,
    /// Number of random obstacle walls
    pub interior_walls: u32,
    /// Headquarters centre
    pub base_center: Vec2,
    pub base_size: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            tile_size: TILE_SIZE,
            interior_walls: INTERIOR_WALLS,
            base_center: Vec2::new(BASE_CENTER.0, BASE_CENTER.1),
            base_size: BASE_SIZE,
        }
    }
}

impl FieldSettings {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Whole grid columns and rows
    pub fn grid(&self) -> (u32, u32) {
        (
            (self.width / self.tile_size).floor() as u32,
            (self.height / self.tile_size).floor() as u32,
        )
    }

    pub fn base_rect(&self) -> Rect {
        Rect::centered(self.base_center, Vec2::splat(self.base_size))
    }
}

/// Projectile shape and lifetime, shared by both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletSettings {
    pub size: f32,
    pub lifetime_ms: f32,
}

impl Default for BulletSettings {
    fn default() -> Self {
        Self {
            size: BULLET_SIZE,
            lifetime_ms: BULLET_LIFETIME_MS,
        }
    }
}

/// Stats every tank variant is built from
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStats {
    pub spawn: Vec2,
    pub size: f32,
    pub speed: f32,
    pub max_health: i32,
    pub direction: Direction,
    pub color: Color,
    pub shoot_cooldown_ms: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
}

/// Player tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub spawn: Vec2,
    pub size: f32,
    pub speed: f32,
    pub max_health: i32,
    pub direction: Direction,
    pub color: Color,
    pub shoot_cooldown_ms: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    pub lives: u32,
    pub respawn_delay_ms: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            size: TANK_SIZE,
            speed: PLAYER_SPEED,
            max_health: TANK_MAX_HEALTH,
            direction: Direction::Up,
            color: Color::YELLOW,
            shoot_cooldown_ms: PLAYER_SHOOT_COOLDOWN_MS,
            bullet_speed: PLAYER_BULLET_SPEED,
            bullet_damage: PLAYER_BULLET_DAMAGE,
            lives: PLAYER_LIVES,
            respawn_delay_ms: PLAYER_RESPAWN_MS,
        }
    }
}

impl PlayerSettings {
    pub fn stats(&self) -> UnitStats {
        UnitStats {
            spawn: self.spawn,
            size: self.size,
            speed: self.speed,
            max_health: self.max_health,
            direction: self.direction,
            color: self.color,
            shoot_cooldown_ms: self.shoot_cooldown_ms,
            bullet_speed: self.bullet_speed,
            bullet_damage: self.bullet_damage,
        }
    }
}

/// Enemy tank and its AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub spawn: Vec2,
    pub size: f32,
    pub speed: f32,
    pub max_health: i32,
    pub direction: Direction,
    pub color: Color,
    pub shoot_cooldown_ms: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    /// Distance to the base (centre to centre) at which the enemy stops and fires
    pub attack_range: f32,
    /// Patrol re-evaluates its heading this often
    pub patrol_turn_ms: f32,
    /// Patrol keeps a heading for this many re-evaluations before turning
    pub patrol_repeats: u32,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(ENEMY_SPAWN.0, ENEMY_SPAWN.1),
            size: TANK_SIZE,
            speed: ENEMY_SPEED,
            max_health: TANK_MAX_HEALTH,
            direction: Direction::Down,
            color: Color::RED,
            shoot_cooldown_ms: ENEMY_SHOOT_COOLDOWN_MS,
            bullet_speed: ENEMY_BULLET_SPEED,
            bullet_damage: ENEMY_BULLET_DAMAGE,
            attack_range: ENEMY_ATTACK_RANGE,
            patrol_turn_ms: ENEMY_PATROL_TURN_MS,
            patrol_repeats: ENEMY_PATROL_REPEATS,
        }
    }
}

impl EnemySettings {
    pub fn stats(&self) -> UnitStats {
        UnitStats {
            spawn: self.spawn,
            size: self.size,
            speed: self.speed,
            max_health: self.max_health,
            direction: self.direction,
            color: self.color,
            shoot_cooldown_ms: self.shoot_cooldown_ms,
            bullet_speed: self.bullet_speed,
            bullet_damage: self.bullet_damage,
        }
    }
}

/// Full game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub field: FieldSettings,
    pub player: PlayerSettings,
    pub enemy: EnemySettings,
    pub bullet: BulletSettings,
}

impl Settings {
    /// Default settings with a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Enemy settings after applying the difficulty preset
    pub fn scaled_enemy(&self) -> EnemySettings {
        let d = self.difficulty;
        EnemySettings {
            speed: self.enemy.speed * d.speed_scale(),
            shoot_cooldown_ms: self.enemy.shoot_cooldown_ms * d.cooldown_scale(),
            attack_range: self.enemy.attack_range * d.range_scale(),
            ..self.enemy.clone()
        }
    }

    /// Parse and validate settings from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// These settings if they validate, otherwise the defaults
    pub fn checked(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                log::error!("Invalid settings, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let f = &self.field;
        if f.width <= 0.0 || f.height <= 0.0 {
            return Err(invalid("field.width/height", "must be positive"));
        }
        if f.tile_size <= 0.0 || f.tile_size > f.width.min(f.height) {
            return Err(invalid("field.tile_size", "must be positive and fit the field"));
        }
        let (cols, rows) = f.grid();
        let interior = cols.saturating_sub(2) * rows.saturating_sub(2);
        if f.interior_walls > interior {
            return Err(invalid(
                "field.interior_walls",
                format!("{} requested but only {} interior cells", f.interior_walls, interior),
            ));
        }
        if f.base_size <= 0.0 || !f.bounds().contains_rect(&f.base_rect()) {
            return Err(invalid("field.base_center", "base must lie inside the field"));
        }

        if self.bullet.size <= 0.0 {
            return Err(invalid("bullet.size", "must be positive"));
        }
        if self.bullet.lifetime_ms <= 0.0 {
            return Err(invalid("bullet.lifetime_ms", "must be positive"));
        }

        if self.player.lives == 0 {
            return Err(invalid("player.lives", "must be at least 1"));
        }
        if self.player.respawn_delay_ms < 0.0 {
            return Err(invalid("player.respawn_delay_ms", "must not be negative"));
        }
        validate_unit("player", &self.player.stats(), f)?;

        let enemy = self.scaled_enemy();
        if enemy.attack_range < 0.0 {
            return Err(invalid("enemy.attack_range", "must not be negative"));
        }
        if enemy.patrol_turn_ms <= 0.0 {
            return Err(invalid("enemy.patrol_turn_ms", "must be positive"));
        }
        validate_unit("enemy", &enemy.stats(), f)?;

        Ok(())
    }
}

fn validate_unit(side: &str, unit: &UnitStats, field: &FieldSettings) -> Result<(), SettingsError> {
    let name = |key: &str| format!("{side}.{key}");

    if unit.size <= 0.0 {
        return Err(invalid(name("size"), "must be positive"));
    }
    if unit.speed <= 0.0 {
        return Err(invalid(name("speed"), "must be positive"));
    }
    if unit.max_health <= 0 {
        return Err(invalid(name("max_health"), "must be positive"));
    }
    if unit.shoot_cooldown_ms < 0.0 {
        return Err(invalid(name("shoot_cooldown_ms"), "must not be negative"));
    }
    if unit.bullet_speed <= 0.0 {
        return Err(invalid(name("bullet_speed"), "must be positive"));
    }
    let spawn = Rect::from_pos_size(unit.spawn, Vec2::splat(unit.size));
    if !field.bounds().contains_rect(&spawn) {
        return Err(invalid(name("spawn"), "tank must spawn inside the field"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.field.grid(), (25, 18));
        assert_eq!(settings.field.base_rect(), Rect::new(380.0, 530.0, 40.0, 40.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json_str(
            r#"{
                "difficulty": "hard",
                "player": { "lives": 5 },
                "field": { "interior_walls": 0 }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.player.lives, 5);
        assert_eq!(settings.player.speed, PLAYER_SPEED);
        assert_eq!(settings.field.interior_walls, 0);
        assert_eq!(settings.field.width, FIELD_WIDTH);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_difficulty(Difficulty::Easy);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_rejects_zero_lives() {
        let err = Settings::from_json_str(r#"{ "player": { "lives": 0 } }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { ref field, .. } if field == "player.lives"));
    }

    #[test]
    fn test_rejects_too_many_walls() {
        let mut settings = Settings::default();
        settings.field.interior_walls = 10_000;
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid { ref field, .. } if field == "field.interior_walls"
        ));
    }

    #[test]
    fn test_rejects_spawn_outside_field() {
        let mut settings = Settings::default();
        settings.enemy.spawn = Vec2::new(790.0, 10.0);
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { ref field, .. } if field == "enemy.spawn"));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_difficulty_scaling() {
        let hard = Settings::from_difficulty(Difficulty::Hard).scaled_enemy();
        assert!(hard.speed > ENEMY_SPEED);
        assert!(hard.shoot_cooldown_ms < ENEMY_SHOOT_COOLDOWN_MS);
        let normal = Settings::default().scaled_enemy();
        assert_eq!(normal, Settings::default().enemy);
        assert_eq!(Difficulty::parse("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("med"), Some(Difficulty::Normal));
        assert_eq!(Difficulty::parse("nightmare"), None);
    }
}
