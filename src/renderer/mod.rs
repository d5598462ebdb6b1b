//! Rendering contract
//!
//! The simulation never draws. A [`Renderer`] receives read-only views of
//! the world once per frame, in a fixed order (see [`render_frame`]).

pub mod ascii;

pub use ascii::AsciiRenderer;

use glam::Vec2;

use crate::sim::{
    AiState, Base, Bullet, CollisionStats, Explosion, GameOverReason, GamePhase, GameState, Tank,
    Wall,
};

/// Heads-up display values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub phase: GamePhase,
    pub game_over: Option<GameOverReason>,
    pub lives: u32,
    pub max_lives: u32,
    pub player_health: i32,
    pub enemy_health: Option<i32>,
    pub enemy_state: Option<AiState>,
    pub ticks: u64,
    pub stats: CollisionStats,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let enemy = state.enemy.as_ref();
        Self {
            phase: state.phase,
            game_over: state.game_over,
            lives: state.player.lives(),
            max_lives: state.player.max_lives(),
            player_health: state.player.health(),
            enemy_health: enemy.map(Tank::health),
            enemy_state: enemy.and_then(Tank::ai_state),
            ticks: state.time_ticks,
            stats: state.collisions.stats(),
        }
    }
}

/// Drawing backend
pub trait Renderer {
    /// Start a frame covering `size` pixels
    fn begin_frame(&mut self, _size: Vec2) {}
    fn draw_wall(&mut self, wall: &Wall);
    fn draw_base(&mut self, base: &Base);
    fn draw_tank(&mut self, tank: &Tank);
    /// Marker at the spawn point while the player waits to respawn
    fn draw_respawn_placeholder(&mut self, pos: Vec2, size: Vec2, remaining_ms: f32);
    fn draw_bullet(&mut self, bullet: &Bullet);
    fn draw_explosion(&mut self, explosion: &Explosion);
    fn draw_hud(&mut self, hud: &Hud);
    fn end_frame(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn begin_frame(&mut self, size: Vec2) {
        (**self).begin_frame(size)
    }
    fn draw_wall(&mut self, wall: &Wall) {
        (**self).draw_wall(wall)
    }
    fn draw_base(&mut self, base: &Base) {
        (**self).draw_base(base)
    }
    fn draw_tank(&mut self, tank: &Tank) {
        (**self).draw_tank(tank)
    }
    fn draw_respawn_placeholder(&mut self, pos: Vec2, size: Vec2, remaining_ms: f32) {
        (**self).draw_respawn_placeholder(pos, size, remaining_ms)
    }
    fn draw_bullet(&mut self, bullet: &Bullet) {
        (**self).draw_bullet(bullet)
    }
    fn draw_explosion(&mut self, explosion: &Explosion) {
        (**self).draw_explosion(explosion)
    }
    fn draw_hud(&mut self, hud: &Hud) {
        (**self).draw_hud(hud)
    }
    fn end_frame(&mut self) {
        (**self).end_frame()
    }
}

/// Draw one frame: walls, base, player (or its respawn marker), enemy,
/// player bullets, enemy bullets, explosions, HUD.
pub fn render_frame(renderer: &mut impl Renderer, state: &GameState, explosions: &[Explosion]) {
    let bounds = state.field.bounds();
    renderer.begin_frame(Vec2::new(bounds.w, bounds.h));

    for wall in state.field.walls() {
        renderer.draw_wall(wall);
    }
    if let Some(base) = state.field.base() {
        renderer.draw_base(base);
    }

    let player = &state.player;
    if player.is_alive() {
        renderer.draw_tank(player);
    } else if let Some(remaining) = player.respawn_remaining() {
        renderer.draw_respawn_placeholder(player.spawn(), player.size, remaining);
    }
    let enemy = state.enemy.as_ref().filter(|e| e.is_alive());
    if let Some(enemy) = enemy {
        renderer.draw_tank(enemy);
    }

    for bullet in player.bullets() {
        renderer.draw_bullet(bullet);
    }
    if let Some(enemy) = state.enemy.as_ref() {
        for bullet in enemy.bullets() {
            renderer.draw_bullet(bullet);
        }
    }
    for explosion in explosions {
        renderer.draw_explosion(explosion);
    }

    renderer.draw_hud(&Hud::from_state(state));
    renderer.end_frame();
}
