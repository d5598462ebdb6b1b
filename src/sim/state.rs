//! Game state
//!
//! Everything the simulation owns for one run: the arena, both tanks, the
//! collision bookkeeping, the seeded RNG and the pending signals.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionManager;
use super::event::{GameEvent, Signals};
use super::field::GameField;
use super::geom::Rect;
use super::tank::Tank;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// World built, waiting for `start`
    Initializing,
    /// Active gameplay
    Running,
    /// Frozen until the pause toggle fires again
    Paused,
    /// Run ended
    GameOver,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    LivesExhausted,
    BaseDestroyed,
}

impl GameOverReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GameOverReason::LivesExhausted => "no lives left",
            GameOverReason::BaseDestroyed => "base destroyed",
        }
    }
}

/// Complete simulation state
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Drives wall layout and enemy patrol turns
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Set once the run ends
    pub game_over: Option<GameOverReason>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub field: GameField,
    pub player: Tank,
    /// The single opponent, if one has been spawned
    pub enemy: Option<Tank>,
    pub collisions: CollisionManager,
    /// Events and explosions since the last drain
    pub signals: Signals,
}

impl GameState {
    /// Build the world for `seed`: field, player and enemy
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let settings = &settings.clone().checked();
        let mut rng = Pcg32::seed_from_u64(seed);
        let bounds = settings.field.bounds();
        let enemy_settings = settings.scaled_enemy();

        let player = Tank::player(&settings.player, &settings.bullet, bounds);
        let enemy = Tank::enemy(&enemy_settings, &settings.bullet, bounds);
        let reserved = [spawn_rect(&player), spawn_rect(&enemy)];
        let field = GameField::generate(&settings.field, &reserved, &mut rng);

        log::info!(
            "World ready (seed {seed}, difficulty {})",
            settings.difficulty.as_str()
        );

        Self {
            seed,
            rng,
            phase: GamePhase::Initializing,
            game_over: None,
            time_ticks: 0,
            field,
            player,
            enemy: Some(enemy),
            collisions: CollisionManager::new(),
            signals: Signals::default(),
        }
    }

    /// State around a hand-built field, for scenarios and tests
    pub fn with_field(
        settings: &Settings,
        seed: u64,
        field: GameField,
        enemy: Option<Tank>,
    ) -> Self {
        let bounds = field.bounds();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            game_over: None,
            time_ticks: 0,
            player: Tank::player(&settings.player, &settings.bullet, bounds),
            field,
            enemy,
            collisions: CollisionManager::new(),
            signals: Signals::default(),
        }
    }

    /// Enter `Running` from `Initializing`. Returns false in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Initializing {
            return false;
        }
        self.phase = GamePhase::Running;
        self.signals.push(GameEvent::GameStarted { seed: self.seed });
        true
    }

    /// Flip between `Running` and `Paused`; other phases are unaffected
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.signals.push(GameEvent::GamePaused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.signals.push(GameEvent::GameResumed);
            }
            GamePhase::Initializing | GamePhase::GameOver => {}
        }
    }

    /// Lives gone or base destroyed
    pub fn check_game_over(&self) -> Option<GameOverReason> {
        if self.player.is_game_over() {
            Some(GameOverReason::LivesExhausted)
        } else if self.field.is_base_destroyed() {
            Some(GameOverReason::BaseDestroyed)
        } else {
            None
        }
    }

    pub fn end(&mut self, reason: GameOverReason) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        log::info!("Game over after {} ticks: {}", self.time_ticks, reason.as_str());
        self.phase = GamePhase::GameOver;
        self.game_over = Some(reason);
        self.signals.push(GameEvent::GameOver { reason });
    }

    /// Take events and explosions raised since the last call
    pub fn take_signals(&mut self) -> Signals {
        self.signals.drain()
    }
}

fn spawn_rect(tank: &Tank) -> Rect {
    Rect::from_pos_size(tank.spawn(), tank.size)
}
