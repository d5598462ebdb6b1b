//! Tanks
//!
//! One concrete unit struct shared by both sides. Side-specific data (lives
//! and respawn for the player, the AI state machine for the enemy) lives in
//! [`UnitKind`] and is dispatched with a plain `match`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, Side};
use super::event::{GameEvent, Signals};
use super::field::Base;
use super::geom::{Direction, Rect};
use crate::settings::{BulletSettings, EnemySettings, PlayerSettings, UnitStats};
use crate::{Color, distance};

/// Enemy behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    /// Wander with periodic turns; used when there is no base to attack
    #[default]
    Patrol,
    /// Close the distance to the base, larger axis first
    MoveToBase,
    /// Hold position, aim at the base and fire
    Attack,
}

impl AiState {
    pub fn as_str(self) -> &'static str {
        match self {
            AiState::Patrol => "patrol",
            AiState::MoveToBase => "move_to_base",
            AiState::Attack => "attack",
        }
    }
}

/// Gun plus the bullets it has fired and not yet lost
#[derive(Debug, Clone)]
pub struct Cannon {
    bullets: Vec<Bullet>,
    since_last_shot: f32,
    cooldown: f32,
    bullet_speed: f32,
    bullet_damage: i32,
    bullet_size: f32,
    bullet_lifetime: f32,
    next_bullet_id: u32,
}

impl Cannon {
    fn new(stats: &UnitStats, bullet: &BulletSettings) -> Self {
        Self {
            bullets: Vec::new(),
            // Loaded at spawn: the first shot is immediate
            since_last_shot: stats.shoot_cooldown_ms,
            cooldown: stats.shoot_cooldown_ms,
            bullet_speed: stats.bullet_speed,
            bullet_damage: stats.bullet_damage,
            bullet_size: bullet.size,
            bullet_lifetime: bullet.lifetime_ms,
            next_bullet_id: 1,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.since_last_shot >= self.cooldown
    }

    /// Milliseconds until the next shot is allowed
    pub fn remaining(&self) -> f32 {
        (self.cooldown - self.since_last_shot).max(0.0)
    }

    fn reload(&mut self) {
        self.since_last_shot = self.cooldown;
    }

    /// Spawn point of a bullet leaving `body` while facing `direction`
    fn muzzle(&self, body: &Rect, direction: Direction) -> Vec2 {
        let half = self.bullet_size / 2.0;
        let center = body.center();
        match direction {
            Direction::Up => Vec2::new(center.x - half, body.y - self.bullet_size),
            Direction::Down => Vec2::new(center.x - half, body.max_y()),
            Direction::Left => Vec2::new(body.x - self.bullet_size, center.y - half),
            Direction::Right => Vec2::new(body.max_x(), center.y - half),
        }
    }

    fn fire(&mut self, body: &Rect, direction: Direction, side: Side) -> &Bullet {
        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        self.since_last_shot = 0.0;
        let bullet = Bullet::new(
            id,
            self.muzzle(body, direction),
            Vec2::splat(self.bullet_size),
            direction,
            self.bullet_speed,
            side,
            self.bullet_damage,
            self.bullet_lifetime,
        );
        self.bullets.push(bullet);
        &self.bullets[self.bullets.len() - 1]
    }
}

/// Reported by [`Tank::shooting_info`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShootingInfo {
    pub can_shoot: bool,
    pub since_last_shot: f32,
    pub cooldown: f32,
    pub remaining: f32,
    pub active_bullets: usize,
}

/// Lives and respawn bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub lives: u32,
    pub max_lives: u32,
    pub respawn_delay: f32,
    /// Elapsed wait while dead with lives left
    respawn_timer: Option<f32>,
    moving: bool,
}

/// Enemy state machine data
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBrain {
    pub state: AiState,
    pub attack_range: f32,
    pub patrol_turn_ms: f32,
    pub patrol_repeats: u32,
    patrol_timer: f32,
    patrol_count: u32,
    moving: bool,
}

/// Read-only view of the enemy AI for debugging and HUDs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AiSnapshot {
    pub state: AiState,
    pub direction: Direction,
    pub moving: bool,
    pub patrol_timer: f32,
    pub patrol_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    Player(PlayerState),
    Enemy(EnemyBrain),
}

/// A combat unit
#[derive(Debug, Clone)]
pub struct Tank {
    pub pos: Vec2,
    pub size: Vec2,
    pub direction: Direction,
    /// Pixels per tick
    pub speed: f32,
    health: i32,
    max_health: i32,
    alive: bool,
    /// Movement limits, normally the field bounds
    pub bounds: Rect,
    pub color: Color,
    spawn: Vec2,
    spawn_direction: Direction,
    cannon: Cannon,
    kind: UnitKind,
}

impl Tank {
    fn new(stats: &UnitStats, bullet: &BulletSettings, bounds: Rect, kind: UnitKind) -> Self {
        Self {
            pos: stats.spawn,
            size: Vec2::splat(stats.size),
            direction: stats.direction,
            speed: stats.speed,
            health: stats.max_health,
            max_health: stats.max_health,
            alive: stats.max_health > 0,
            bounds,
            color: stats.color,
            spawn: stats.spawn,
            spawn_direction: stats.direction,
            cannon: Cannon::new(stats, bullet),
            kind,
        }
    }

    pub fn player(settings: &PlayerSettings, bullet: &BulletSettings, bounds: Rect) -> Self {
        let state = PlayerState {
            lives: settings.lives,
            max_lives: settings.lives,
            respawn_delay: settings.respawn_delay_ms,
            respawn_timer: None,
            moving: false,
        };
        Self::new(&settings.stats(), bullet, bounds, UnitKind::Player(state))
    }

    pub fn enemy(settings: &EnemySettings, bullet: &BulletSettings, bounds: Rect) -> Self {
        let brain = EnemyBrain {
            state: AiState::Patrol,
            attack_range: settings.attack_range,
            patrol_turn_ms: settings.patrol_turn_ms,
            patrol_repeats: settings.patrol_repeats,
            patrol_timer: 0.0,
            patrol_count: 0,
            moving: false,
        };
        Self::new(&settings.stats(), bullet, bounds, UnitKind::Enemy(brain))
    }

    pub fn side(&self) -> Side {
        match self.kind {
            UnitKind::Player(_) => Side::Player,
            UnitKind::Enemy(_) => Side::Enemy,
        }
    }

    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.cannon.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut [Bullet] {
        &mut self.cannon.bullets
    }

    /// Drop bullets marked inactive
    pub fn remove_inactive_bullets(&mut self) {
        self.cannon.bullets.retain(Bullet::is_active);
    }

    pub fn clear_bullets(&mut self) {
        self.cannon.bullets.clear();
    }

    pub fn can_shoot(&self) -> bool {
        self.alive && self.cannon.is_ready()
    }

    pub fn shooting_info(&self) -> ShootingInfo {
        ShootingInfo {
            can_shoot: self.can_shoot(),
            since_last_shot: self.cannon.since_last_shot,
            cooldown: self.cannon.cooldown,
            remaining: self.cannon.remaining(),
            active_bullets: self.cannon.bullets.len(),
        }
    }

    /// Change the reload time; negative values clamp to zero
    pub fn set_shoot_cooldown(&mut self, cooldown_ms: f32) {
        self.cannon.cooldown = cooldown_ms.max(0.0);
    }

    /// Lives left (enemies have none)
    pub fn lives(&self) -> u32 {
        match &self.kind {
            UnitKind::Player(p) => p.lives,
            UnitKind::Enemy(_) => 0,
        }
    }

    pub fn max_lives(&self) -> u32 {
        match &self.kind {
            UnitKind::Player(p) => p.max_lives,
            UnitKind::Enemy(_) => 0,
        }
    }

    pub fn is_respawning(&self) -> bool {
        matches!(&self.kind, UnitKind::Player(p) if p.respawn_timer.is_some())
    }

    /// Milliseconds until respawn, while waiting
    pub fn respawn_remaining(&self) -> Option<f32> {
        match &self.kind {
            UnitKind::Player(p) => p.respawn_timer.map(|t| (p.respawn_delay - t).max(0.0)),
            UnitKind::Enemy(_) => None,
        }
    }

    /// Dead with no lives left
    pub fn is_game_over(&self) -> bool {
        match &self.kind {
            UnitKind::Player(p) => !self.alive && p.lives == 0,
            UnitKind::Enemy(_) => false,
        }
    }

    pub fn is_moving(&self) -> bool {
        match &self.kind {
            UnitKind::Player(p) => p.moving,
            UnitKind::Enemy(b) => b.moving,
        }
    }

    pub fn ai_state(&self) -> Option<AiState> {
        match &self.kind {
            UnitKind::Enemy(b) => Some(b.state),
            UnitKind::Player(_) => None,
        }
    }

    pub fn ai_snapshot(&self) -> Option<AiSnapshot> {
        match &self.kind {
            UnitKind::Enemy(b) => Some(AiSnapshot {
                state: b.state,
                direction: self.direction,
                moving: b.moving,
                patrol_timer: b.patrol_timer,
                patrol_count: b.patrol_count,
            }),
            UnitKind::Player(_) => None,
        }
    }

    /// Face `direction` and step `speed` pixels if the result stays in bounds.
    /// Returns false when the move was rejected.
    pub fn try_move(&mut self, direction: Direction) -> bool {
        if !self.alive {
            return false;
        }
        self.direction = direction;
        let candidate = self.pos + direction.delta() * self.speed;
        if self.bounds.contains_rect(&Rect::from_pos_size(candidate, self.size)) {
            self.pos = candidate;
            true
        } else {
            false
        }
    }

    /// Fire along the current facing if reloaded
    pub fn shoot(&mut self, signals: &mut Signals) -> bool {
        if !self.alive {
            return false;
        }
        let side = self.side();
        if !self.cannon.is_ready() {
            signals.push(GameEvent::ShotBlocked {
                side,
                remaining_ms: self.cannon.remaining(),
            });
            return false;
        }
        let body = self.rect();
        let bullet = self.cannon.fire(&body, self.direction, side);
        signals.push(GameEvent::BulletFired {
            side,
            bullet_id: bullet.id,
            pos: bullet.pos,
            direction: bullet.direction(),
        });
        true
    }

    /// Subtract `amount` health. Returns true if this hit destroyed the tank.
    pub fn take_damage(&mut self, amount: i32, signals: &mut Signals) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount.max(0)).max(0);
        if self.health > 0 {
            return false;
        }
        self.destroyed(signals);
        true
    }

    /// Destroy outright, as if by a lethal hit
    pub fn kill(&mut self, signals: &mut Signals) {
        if self.alive {
            self.health = 0;
            self.destroyed(signals);
        }
    }

    fn destroyed(&mut self, signals: &mut Signals) {
        self.alive = false;
        self.cannon.bullets.clear();
        match &mut self.kind {
            UnitKind::Player(p) => {
                p.lives = p.lives.saturating_sub(1);
                p.moving = false;
                signals.push(GameEvent::PlayerDestroyed {
                    lives_left: p.lives,
                });
                if p.lives > 0 {
                    p.respawn_timer = Some(0.0);
                    signals.push(GameEvent::PlayerRespawning {
                        delay_ms: p.respawn_delay,
                    });
                }
            }
            UnitKind::Enemy(b) => {
                b.moving = false;
                signals.push(GameEvent::EnemyDestroyed);
            }
        }
    }

    /// Back to full health at the spawn point, bullets cleared
    pub fn respawn(&mut self, signals: &mut Signals) {
        self.health = self.max_health;
        self.alive = true;
        self.pos = self.spawn;
        self.direction = self.spawn_direction;
        self.cannon.bullets.clear();
        self.cannon.reload();
        if let UnitKind::Player(p) = &mut self.kind {
            p.respawn_timer = None;
            p.moving = false;
            signals.push(GameEvent::PlayerRespawned);
        }
    }

    /// Apply one tick of player input. Ignored for enemies and while dead.
    pub fn apply_input(
        &mut self,
        direction: Option<Direction>,
        shoot: bool,
        signals: &mut Signals,
    ) {
        if !self.alive {
            return;
        }
        let UnitKind::Player(p) = &mut self.kind else {
            return;
        };
        let was_moving = p.moving;
        p.moving = direction.is_some();
        match direction {
            Some(d) if !was_moving => signals.push(GameEvent::PlayerStartedMoving { direction: d }),
            None if was_moving => signals.push(GameEvent::PlayerStoppedMoving),
            _ => {}
        }
        if let Some(d) = direction {
            self.try_move(d);
        }
        if shoot {
            self.shoot(signals);
        }
    }

    /// Advance timers, AI and owned bullets by `dt` milliseconds
    pub fn update(
        &mut self,
        dt: f32,
        base: Option<&Base>,
        rng: &mut impl Rng,
        signals: &mut Signals,
    ) {
        match self.kind {
            UnitKind::Player(_) => self.update_player(dt, signals),
            UnitKind::Enemy(_) => self.update_enemy(dt, base, rng, signals),
        }
    }

    fn update_player(&mut self, dt: f32, signals: &mut Signals) {
        if let UnitKind::Player(p) = &mut self.kind
            && let Some(elapsed) = p.respawn_timer.as_mut()
        {
            *elapsed += dt;
            if *elapsed >= p.respawn_delay {
                self.respawn(signals);
            }
            return;
        }
        if !self.alive {
            return;
        }
        self.cannon.since_last_shot += dt;
        self.update_bullets(dt);
    }

    fn update_enemy(
        &mut self,
        dt: f32,
        base: Option<&Base>,
        rng: &mut impl Rng,
        signals: &mut Signals,
    ) {
        if !self.alive {
            return;
        }
        self.cannon.since_last_shot += dt;
        self.think(dt, base, rng, signals);
        self.update_bullets(dt);
    }

    /// Move bullets; drop expired and out-of-bounds ones
    fn update_bullets(&mut self, dt: f32) {
        let bounds = self.bounds;
        for bullet in &mut self.cannon.bullets {
            bullet.update(dt);
        }
        self.cannon
            .bullets
            .retain(|b| b.is_active() && !b.is_out_of_bounds(&bounds));
    }

    /// Facing whose line of fire crosses `target`, trying the approach axis first
    fn aim_at(&self, target: &Rect) -> Option<Direction> {
        let body = self.rect();
        let size = Vec2::splat(self.cannon.bullet_size);
        let approach = Direction::toward(target.center() - body.center());
        std::iter::once(approach).chain(Direction::ALL).find(|&d| {
            Rect::from_pos_size(self.cannon.muzzle(&body, d), size)
                .swept(d, &self.bounds)
                .overlaps(target)
        })
    }

    /// One step of the enemy state machine
    fn think(&mut self, dt: f32, base: Option<&Base>, rng: &mut impl Rng, signals: &mut Signals) {
        let center = self.center();
        let base = base.filter(|b| !b.is_destroyed());
        let aim = base.and_then(|b| self.aim_at(&b.rect));
        let target = base.map(Base::center);
        let UnitKind::Enemy(brain) = &mut self.kind else {
            return;
        };

        // In range but without a line of fire keeps closing in
        let desired = match (target, aim) {
            (Some(t), Some(_)) if distance(center, t) <= brain.attack_range => AiState::Attack,
            (Some(_), _) => AiState::MoveToBase,
            (None, _) => AiState::Patrol,
        };
        if desired != brain.state {
            signals.push(GameEvent::EnemyStateChanged {
                from: brain.state,
                to: desired,
            });
            brain.state = desired;
            brain.patrol_timer = 0.0;
            brain.patrol_count = 0;
        }

        match (desired, target, aim) {
            (AiState::Attack, Some(_), Some(facing)) => {
                brain.moving = false;
                self.direction = facing;
                if self.cannon.is_ready() {
                    self.shoot(signals);
                }
            }
            (AiState::MoveToBase, Some(t), _) => {
                brain.moving = true;
                let delta = t - center;
                let step = if distance(center, t) <= brain.attack_range {
                    Direction::across(delta).unwrap_or_else(|| Direction::toward(delta))
                } else {
                    Direction::toward(delta)
                };
                self.advance(step, signals);
            }
            _ => {
                brain.moving = true;
                brain.patrol_timer += dt;
                let mut turn = false;
                if brain.patrol_turn_ms > 0.0 && brain.patrol_timer >= brain.patrol_turn_ms {
                    brain.patrol_timer = 0.0;
                    brain.patrol_count += 1;
                    if brain.patrol_count >= brain.patrol_repeats {
                        brain.patrol_count = 0;
                        turn = true;
                    }
                }
                if turn {
                    let from = self.direction;
                    let to = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
                    if to != from {
                        self.direction = to;
                        signals.push(GameEvent::EnemyTurned { from, to });
                    }
                }
                self.advance(self.direction, signals);
                if self.cannon.is_ready() {
                    self.shoot(signals);
                }
            }
        }
    }

    /// Enemy step: a rejected move reverses the heading
    fn advance(&mut self, direction: Direction, signals: &mut Signals) {
        if !self.try_move(direction) {
            let to = direction.reversed();
            self.direction = to;
            signals.push(GameEvent::EnemyTurned {
                from: direction,
                to,
            });
        }
    }

    /// Pull the tank back inside `bounds`, per axis. Returns true if it moved.
    pub fn clamp_to(&mut self, bounds: &Rect) -> bool {
        let clamped = bounds.clamp_pos(self.pos, self.size);
        if clamped != self.pos {
            self.pos = clamped;
            true
        } else {
            false
        }
    }
}
