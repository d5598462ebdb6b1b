//! Projectiles
//!
//! A bullet flies in a straight line at constant speed. It never checks
//! collisions itself; the collision sweep reads its rectangle and owner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Direction, Rect};

/// Which side a tank or bullet belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Enemy => "enemy",
        }
    }
}

/// A moving projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    /// Unique id within a run
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    direction: Direction,
    /// Pixels per tick
    pub speed: f32,
    pub owner: Side,
    /// Damage dealt to a tank on hit
    pub damage: i32,
    /// Milliseconds since creation
    pub age: f32,
    /// Milliseconds until expiry
    pub lifetime: f32,
    active: bool,
}

impl Bullet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        pos: Vec2,
        size: Vec2,
        direction: Direction,
        speed: f32,
        owner: Side,
        damage: i32,
        lifetime: f32,
    ) -> Self {
        Self {
            id,
            pos,
            size,
            direction,
            speed,
            owner,
            damage,
            age: 0.0,
            lifetime,
            active: true,
        }
    }

    /// Fixed at creation
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark consumed/expired; idempotent
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Age the bullet, then advance it unless it just expired
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.age += dt;
        if self.age >= self.lifetime {
            self.active = false;
            return;
        }
        self.pos += self.direction.delta() * self.speed;
    }

    /// Strictly outside the field rectangle
    pub fn is_out_of_bounds(&self, bounds: &Rect) -> bool {
        self.pos.x < bounds.min_x()
            || self.pos.x > bounds.max_x()
            || self.pos.y < bounds.min_y()
            || self.pos.y > bounds.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet(direction: Direction) -> Bullet {
        Bullet::new(
            1,
            Vec2::new(100.0, 100.0),
            Vec2::splat(4.0),
            direction,
            6.0,
            Side::Player,
            25,
            3000.0,
        )
    }

    #[test]
    fn test_moves_along_direction() {
        let mut b = bullet(Direction::Right);
        b.update(16.0);
        assert_eq!(b.pos, Vec2::new(106.0, 100.0));

        let mut b = bullet(Direction::Up);
        b.update(16.0);
        assert_eq!(b.pos, Vec2::new(100.0, 94.0));
    }

    #[test]
    fn test_expires_at_lifetime() {
        let mut b = bullet(Direction::Down);
        b.update(2999.0);
        assert!(b.is_active());
        let before = b.pos;
        b.update(1.0);
        assert!(!b.is_active());
        // No movement on the expiring tick
        assert_eq!(b.pos, before);
    }

    #[test]
    fn test_inactive_bullet_is_frozen() {
        let mut b = bullet(Direction::Left);
        b.deactivate();
        b.deactivate();
        b.update(16.0);
        assert_eq!(b.pos, Vec2::new(100.0, 100.0));
        assert_eq!(b.age, 0.0);
    }

    #[test]
    fn test_out_of_bounds_is_strict() {
        let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut b = bullet(Direction::Right);
        b.pos = Vec2::new(800.0, 300.0);
        assert!(!b.is_out_of_bounds(&bounds));
        b.pos = Vec2::new(800.5, 300.0);
        assert!(b.is_out_of_bounds(&bounds));
        b.pos = Vec2::new(10.0, -0.1);
        assert!(b.is_out_of_bounds(&bounds));
    }
}
