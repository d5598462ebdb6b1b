//! Notifications raised by the simulation
//!
//! The simulation never talks to a sink directly. Each tick pushes
//! [`GameEvent`]s and [`Explosion`]s into a [`Signals`] buffer which the
//! orchestrator drains once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::Side;
use super::field::{ExplosionClass, Material};
use super::geom::Direction;
use super::state::GameOverReason;
use super::tank::AiState;
use crate::logger::LogCategory;

/// A visual explosion request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub class: ExplosionClass,
}

/// Something worth telling the player about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted { seed: u64 },
    GamePaused,
    GameResumed,
    GameOver { reason: GameOverReason },
    BulletFired { side: Side, bullet_id: u32, pos: Vec2, direction: Direction },
    /// Shot requested while the cannon was still cooling down
    ShotBlocked { side: Side, remaining_ms: f32 },
    PlayerStartedMoving { direction: Direction },
    PlayerStoppedMoving,
    TankHit { side: Side, damage: i32, health: i32 },
    PlayerDestroyed { lives_left: u32 },
    PlayerRespawning { delay_ms: f32 },
    PlayerRespawned,
    EnemyDestroyed,
    EnemyStateChanged { from: AiState, to: AiState },
    /// Enemy changed heading (blocked move or patrol turn)
    EnemyTurned { from: Direction, to: Direction },
    BaseDestroyed,
    BulletsCollided { pos: Vec2 },
    WallDamaged { wall_id: u32, material: Material, health: i32 },
    WallDestroyed { wall_id: u32, material: Material },
    /// A tank was pushed back inside the field
    TankClamped { side: Side },
}

impl GameEvent {
    /// Message, category and optional details for an event sink
    pub fn log_entry(&self) -> (String, LogCategory, Option<String>) {
        match self {
            GameEvent::GameStarted { seed } => (
                "Game started".to_string(),
                LogCategory::Game,
                Some(format!("seed {seed}")),
            ),
            GameEvent::GamePaused => ("Game paused".to_string(), LogCategory::Game, None),
            GameEvent::GameResumed => ("Game resumed".to_string(), LogCategory::Game, None),
            GameEvent::GameOver { reason } => (
                "Game over".to_string(),
                LogCategory::Error,
                Some(reason.as_str().to_string()),
            ),
            GameEvent::BulletFired {
                side,
                bullet_id,
                pos,
                direction,
            } => (
                format!("{} fired", side_name(*side)),
                side_category(*side),
                Some(format!(
                    "bullet {bullet_id} {direction} from ({:.0}, {:.0})",
                    pos.x, pos.y
                )),
            ),
            GameEvent::ShotBlocked { side, remaining_ms } => (
                format!("{} cannon reloading", side_name(*side)),
                LogCategory::Info,
                Some(format!("{remaining_ms:.0} ms left")),
            ),
            GameEvent::PlayerStartedMoving { direction } => (
                "Player moving".to_string(),
                LogCategory::Player,
                Some(direction.to_string()),
            ),
            GameEvent::PlayerStoppedMoving => {
                ("Player stopped".to_string(), LogCategory::Player, None)
            }
            GameEvent::TankHit {
                side,
                damage,
                health,
            } => (
                format!("{} hit", side_name(*side)),
                LogCategory::Warning,
                Some(format!("-{damage}, health {health}")),
            ),
            GameEvent::PlayerDestroyed { lives_left } => (
                "Player destroyed".to_string(),
                LogCategory::Error,
                Some(format!("{lives_left} lives left")),
            ),
            GameEvent::PlayerRespawning { delay_ms } => (
                "Player respawning".to_string(),
                LogCategory::Player,
                Some(format!("in {delay_ms:.0} ms")),
            ),
            GameEvent::PlayerRespawned => {
                ("Player respawned".to_string(), LogCategory::Success, None)
            }
            GameEvent::EnemyDestroyed => {
                ("Enemy destroyed".to_string(), LogCategory::Success, None)
            }
            GameEvent::EnemyStateChanged { from, to } => (
                "Enemy state changed".to_string(),
                LogCategory::Enemy,
                Some(format!("{} -> {}", from.as_str(), to.as_str())),
            ),
            GameEvent::EnemyTurned { from, to } => (
                "Enemy turned".to_string(),
                LogCategory::Enemy,
                Some(format!("{from} -> {to}")),
            ),
            GameEvent::BaseDestroyed => {
                ("Base destroyed".to_string(), LogCategory::Error, None)
            }
            GameEvent::BulletsCollided { pos } => (
                "Bullets collided".to_string(),
                LogCategory::Info,
                Some(format!("at ({:.0}, {:.0})", pos.x, pos.y)),
            ),
            GameEvent::WallDamaged {
                wall_id,
                material,
                health,
            } => (
                format!("{} wall damaged", material.as_str()),
                LogCategory::Info,
                Some(format!("wall {wall_id}, health {health}")),
            ),
            GameEvent::WallDestroyed { wall_id, material } => (
                format!("{} wall destroyed", material.as_str()),
                LogCategory::Success,
                Some(format!("wall {wall_id}")),
            ),
            GameEvent::TankClamped { side } => (
                format!("{} pushed back into the field", side_name(*side)),
                LogCategory::Warning,
                None,
            ),
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Player => "Player",
        Side::Enemy => "Enemy",
    }
}

fn side_category(side: Side) -> LogCategory {
    match side {
        Side::Player => LogCategory::Player,
        Side::Enemy => LogCategory::Enemy,
    }
}

/// Per-frame outbox for events and explosions
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub events: Vec<GameEvent>,
    pub explosions: Vec<Explosion>,
}

impl Signals {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn explode(&mut self, pos: Vec2, class: ExplosionClass) {
        self.explosions.push(Explosion { pos, class });
    }

    /// Take everything accumulated since the last drain
    pub fn drain(&mut self) -> Signals {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.explosions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_categories() {
        let (msg, cat, details) = GameEvent::PlayerDestroyed { lives_left: 2 }.log_entry();
        assert_eq!(msg, "Player destroyed");
        assert_eq!(cat, LogCategory::Error);
        assert_eq!(details.as_deref(), Some("2 lives left"));

        let (_, cat, _) = GameEvent::BulletFired {
            side: Side::Enemy,
            bullet_id: 4,
            pos: Vec2::ZERO,
            direction: Direction::Down,
        }
        .log_entry();
        assert_eq!(cat, LogCategory::Enemy);

        let (_, cat, details) = GameEvent::EnemyStateChanged {
            from: AiState::Patrol,
            to: AiState::Attack,
        }
        .log_entry();
        assert_eq!(cat, LogCategory::Enemy);
        assert_eq!(details.as_deref(), Some("patrol -> attack"));
    }

    #[test]
    fn test_drain_empties_buffer() {
        let mut signals = Signals::default();
        signals.push(GameEvent::GamePaused);
        signals.explode(Vec2::new(1.0, 2.0), ExplosionClass::Small);
        let taken = signals.drain();
        assert_eq!(taken.events, vec![GameEvent::GamePaused]);
        assert_eq!(taken.explosions.len(), 1);
        assert!(signals.is_empty());
    }
}
