//! Fixed-order simulation tick
//!
//! pause toggle -> game-over check -> field -> player input -> player ->
//! enemy -> collision sweep

use super::geom::Direction;
use super::state::{GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire (held or pressed this frame)
    pub shoot: bool,
    /// Pause toggle, one-shot
    pub pause: bool,
}

impl TickInput {
    /// Single cardinal direction; up > down > left > right when several are held
    pub fn movement(&self) -> Option<Direction> {
        if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Advance the game state by `dt` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Don't tick unless running
    if state.phase != GamePhase::Running {
        return;
    }

    if let Some(reason) = state.check_game_over() {
        state.end(reason);
        return;
    }

    state.time_ticks += 1;
    state.field.update(dt);

    state
        .player
        .apply_input(input.movement(), input.shoot, &mut state.signals);
    state
        .player
        .update(dt, state.field.base(), &mut state.rng, &mut state.signals);
    if let Some(enemy) = state.enemy.as_mut() {
        enemy.update(dt, state.field.base(), &mut state.rng, &mut state.signals);
    }

    if !state.player.is_respawning() {
        state.collisions.check_all(
            &mut state.player,
            state.enemy.as_mut(),
            &mut state.field,
            &mut state.signals,
        );
    }
}
