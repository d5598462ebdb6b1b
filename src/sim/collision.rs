//! Collision detection and response
//!
//! One sweep per tick, in a fixed order:
//!
//! 1. player bullets vs enemy (first hit only)
//! 2. enemy bullets vs player (first hit only)
//! 3. enemy bullets vs base
//! 4. player bullets vs enemy bullets (first pair only)
//! 5. every remaining bullet vs walls
//! 6. tanks clamped back inside the field
//!
//! A bullet consumed by an earlier category is marked inactive at once so
//! later categories skip it, and is dropped from its owner at the end.

use serde::Serialize;

use super::bullet::{Bullet, Side};
use super::event::{GameEvent, Signals};
use super::field::{ExplosionClass, GameField, WallDamage};
use super::geom::Rect;
use super::tank::Tank;

/// Running totals since construction or the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollisionStats {
    /// Every resolved interaction (tank, base, bullet and wall hits)
    pub total_collisions: u32,
    /// Hits taken by the player
    pub player_hits: u32,
    /// Hits taken by the enemy
    pub enemy_hits: u32,
    pub bullet_collisions: u32,
    pub wall_destructions: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionManager {
    stats: CollisionStats,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CollisionStats::default();
    }

    /// Run the full sweep for one tick
    pub fn check_all(
        &mut self,
        player: &mut Tank,
        mut enemy: Option<&mut Tank>,
        field: &mut GameField,
        signals: &mut Signals,
    ) {
        let bounds = field.bounds();

        if let Some(enemy) = enemy.as_deref_mut() {
            let duel = player.is_alive() && enemy.is_alive() && !player.is_respawning();
            if duel {
                self.bullets_vs_tank(player, enemy, &bounds, ExplosionClass::Large, signals);
            }
            // The previous pass may have destroyed the enemy
            let duel = player.is_alive() && enemy.is_alive() && !player.is_respawning();
            if duel {
                self.bullets_vs_tank(enemy, player, &bounds, ExplosionClass::Medium, signals);
            }
            if enemy.is_alive() {
                self.bullets_vs_base(enemy, field, signals);
            }
            let duel = player.is_alive() && enemy.is_alive() && !player.is_respawning();
            if duel {
                self.bullets_vs_bullets(player, enemy, signals);
            }
        }

        self.bullets_vs_walls(player, field, signals);
        if let Some(enemy) = enemy.as_deref_mut() {
            self.bullets_vs_walls(enemy, field, signals);
        }

        player.remove_inactive_bullets();
        if let Some(enemy) = enemy.as_deref_mut() {
            enemy.remove_inactive_bullets();
        }

        for tank in std::iter::once(player).chain(enemy) {
            if tank.is_alive() && tank.clamp_to(&bounds) {
                signals.push(GameEvent::TankClamped { side: tank.side() });
            }
        }
    }

    /// `shooter`'s bullets against `target`, newest first. Stops after the
    /// first hit; bullets found outside the field along the way are consumed.
    fn bullets_vs_tank(
        &mut self,
        shooter: &mut Tank,
        target: &mut Tank,
        bounds: &Rect,
        class: ExplosionClass,
        signals: &mut Signals,
    ) {
        let target_rect = target.rect();
        let mut hit = None;
        for bullet in shooter.bullets_mut().iter_mut().rev() {
            if !bullet.is_active() {
                continue;
            }
            if bullet.rect().overlaps(&target_rect) {
                bullet.deactivate();
                hit = Some(bullet.damage);
                break;
            }
            if bullet.is_out_of_bounds(bounds) {
                bullet.deactivate();
            }
        }
        let Some(damage) = hit else {
            return;
        };

        self.stats.total_collisions += 1;
        match target.side() {
            Side::Player => self.stats.player_hits += 1,
            Side::Enemy => self.stats.enemy_hits += 1,
        }
        signals.explode(target.center(), class);
        target.take_damage(damage, signals);
        signals.push(GameEvent::TankHit {
            side: target.side(),
            damage,
            health: target.health(),
        });
    }

    fn bullets_vs_base(
        &mut self,
        shooter: &mut Tank,
        field: &mut GameField,
        signals: &mut Signals,
    ) {
        let Some(base) = field.base().filter(|b| !b.is_destroyed()) else {
            return;
        };
        let base_rect = base.rect;
        let Some(bullet) = shooter
            .bullets_mut()
            .iter_mut()
            .rev()
            .find(|b| b.is_active() && b.rect().overlaps(&base_rect))
        else {
            return;
        };
        bullet.deactivate();
        let pos = bullet.pos;

        self.stats.total_collisions += 1;
        signals.explode(pos, ExplosionClass::Large);
        if field.destroy_base() {
            signals.push(GameEvent::BaseDestroyed);
        }
    }

    /// First overlapping player/enemy pair annihilates
    fn bullets_vs_bullets(&mut self, player: &mut Tank, enemy: &mut Tank, signals: &mut Signals) {
        let pair = find_pair(player.bullets(), enemy.bullets());
        let Some((i, j)) = pair else {
            return;
        };
        let pos = player.bullets()[i].pos;
        player.bullets_mut()[i].deactivate();
        enemy.bullets_mut()[j].deactivate();

        self.stats.total_collisions += 1;
        self.stats.bullet_collisions += 1;
        signals.explode(pos, ExplosionClass::Small);
        signals.push(GameEvent::BulletsCollided { pos });
    }

    /// Each live bullet against walls, last wall first; one damage per hit
    fn bullets_vs_walls(
        &mut self,
        shooter: &mut Tank,
        field: &mut GameField,
        signals: &mut Signals,
    ) {
        for bullet in shooter.bullets_mut().iter_mut().rev() {
            if !bullet.is_active() {
                continue;
            }
            let rect = bullet.rect();
            let Some(wall) = field.walls().iter().rev().find(|w| w.rect.overlaps(&rect)) else {
                continue;
            };
            let (wall_id, material) = (wall.id, wall.material);
            bullet.deactivate();

            self.stats.total_collisions += 1;
            signals.explode(bullet.pos, material.explosion());
            match field.damage_wall(wall_id, 1) {
                WallDamage::Damaged { health } => signals.push(GameEvent::WallDamaged {
                    wall_id,
                    material,
                    health,
                }),
                WallDamage::Destroyed => {
                    self.stats.wall_destructions += 1;
                    signals.push(GameEvent::WallDestroyed { wall_id, material });
                }
                WallDamage::Missing => {}
            }
        }
    }
}

/// Indices of the first overlapping active pair, scanning in order
fn find_pair(a: &[Bullet], b: &[Bullet]) -> Option<(usize, usize)> {
    a.iter().enumerate().filter(|(_, x)| x.is_active()).find_map(|(i, x)| {
        let rect = x.rect();
        b.iter()
            .position(|y| y.is_active() && y.rect().overlaps(&rect))
            .map(|j| (i, j))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::field::{Material, WallKind};
    use crate::sim::geom::Direction;
    use glam::Vec2;

    fn arena() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn tanks() -> (Tank, Tank) {
        let s = Settings::default();
        (
            Tank::player(&s.player, &s.bullet, arena()),
            Tank::enemy(&s.enemy, &s.bullet, arena()),
        )
    }

    /// Fire one bullet from `tank` and move it to `pos`
    fn place_bullet(tank: &mut Tank, direction: Direction, pos: Vec2) {
        let mut signals = Signals::default();
        tank.set_shoot_cooldown(0.0);
        tank.direction = direction;
        assert!(tank.shoot(&mut signals));
        tank.bullets_mut().last_mut().unwrap().pos = pos;
    }

    #[test]
    fn test_player_bullet_hits_enemy() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(301.0, 210.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert!(player.bullets().is_empty());
        assert_eq!(enemy.health(), 75);
        assert_eq!(manager.stats().enemy_hits, 1);
        assert_eq!(signals.explosions[0].class, ExplosionClass::Large);
        assert_eq!(signals.explosions[0].pos, enemy.center());
    }

    #[test]
    fn test_only_first_hit_per_tick() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(301.0, 210.0));
        place_bullet(&mut player, Direction::Right, Vec2::new(305.0, 210.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(player.bullets().len(), 1);
        assert_eq!(enemy.health(), 75);
        // The newest bullet is consumed first
        assert_eq!(player.bullets()[0].pos, Vec2::new(301.0, 210.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert!(player.bullets().is_empty());
        assert_eq!(enemy.health(), 50);
    }

    #[test]
    fn test_enemy_bullet_kills_player() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut enemy, Direction::Up, Vec2::new(110.0, 120.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert!(!player.is_alive());
        assert!(player.is_respawning());
        assert_eq!(player.lives(), 2);
        assert_eq!(manager.stats().player_hits, 1);
        assert_eq!(signals.explosions[0].class, ExplosionClass::Medium);
    }

    #[test]
    fn test_no_damage_while_respawning() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        player.kill(&mut signals);
        place_bullet(&mut enemy, Direction::Up, Vec2::new(110.0, 120.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(player.lives(), 2);
        assert_eq!(enemy.bullets().len(), 1);
        assert_eq!(manager.stats().player_hits, 0);
    }

    #[test]
    fn test_enemy_bullet_destroys_base() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::with_base(arena(), 32.0, Rect::new(380.0, 530.0, 40.0, 40.0));
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut enemy, Direction::Down, Vec2::new(398.0, 531.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert!(field.is_base_destroyed());
        assert!(enemy.bullets().is_empty());
        assert_eq!(signals.events, vec![GameEvent::BaseDestroyed]);

        // Destroyed base no longer absorbs bullets
        place_bullet(&mut enemy, Direction::Down, Vec2::new(398.0, 531.0));
        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(enemy.bullets().len(), 1);
    }

    #[test]
    fn test_bullets_annihilate() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(500.0, 400.0));
        place_bullet(&mut enemy, Direction::Left, Vec2::new(502.0, 401.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert!(player.bullets().is_empty());
        assert!(enemy.bullets().is_empty());
        assert_eq!(player.health(), 100);
        assert_eq!(enemy.health(), 100);
        let collided = signals
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BulletsCollided { .. }))
            .count();
        assert_eq!(collided, 1);
        assert_eq!(manager.stats().bullet_collisions, 1);
    }

    #[test]
    fn test_consumed_bullet_skips_walls() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let rect = Rect::new(480.0, 384.0, 32.0, 32.0);
        let wall = field.add_wall(rect, WallKind::Obstacle, Material::Brick);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(500.0, 400.0));
        place_bullet(&mut enemy, Direction::Left, Vec2::new(502.0, 401.0));

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(field.wall(wall).unwrap().health, 3);
    }

    #[test]
    fn test_brick_wall_takes_three_hits() {
        let (mut player, _) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let rect = Rect::new(480.0, 384.0, 32.0, 32.0);
        let wall = field.add_wall(rect, WallKind::Obstacle, Material::Brick);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();

        for expected in [2, 1] {
            place_bullet(&mut player, Direction::Right, Vec2::new(482.0, 390.0));
            manager.check_all(&mut player, None, &mut field, &mut signals);
            assert_eq!(field.wall(wall).unwrap().health, expected);
            assert!(player.bullets().is_empty());
        }
        place_bullet(&mut player, Direction::Right, Vec2::new(482.0, 390.0));
        manager.check_all(&mut player, None, &mut field, &mut signals);
        assert!(field.wall(wall).is_none());
        assert_eq!(manager.stats().wall_destructions, 1);
        assert_eq!(signals.explosions.last().unwrap().class, ExplosionClass::Medium);
        assert!(signals.events.contains(&GameEvent::WallDestroyed {
            wall_id: wall,
            material: Material::Brick
        }));
    }

    #[test]
    fn test_wood_wall_falls_to_one_hit() {
        let (mut player, _) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let rect = Rect::new(480.0, 384.0, 32.0, 32.0);
        let wall = field.add_wall(rect, WallKind::Obstacle, Material::Wood);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();

        place_bullet(&mut player, Direction::Right, Vec2::new(482.0, 390.0));
        manager.check_all(&mut player, None, &mut field, &mut signals);
        assert!(field.wall(wall).is_none());
        assert!(player.bullets().is_empty());
        assert_eq!(manager.stats().wall_destructions, 1);
        let explosion = signals.explosions.last().unwrap();
        assert_eq!(explosion.class, ExplosionClass::Small);
        assert_eq!(explosion.class.as_str(), "wall");
        assert!(signals.events.contains(&GameEvent::WallDestroyed {
            wall_id: wall,
            material: Material::Wood
        }));
    }

    #[test]
    fn test_concrete_wall_takes_ten_hits() {
        let (mut player, _) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let rect = Rect::new(480.0, 384.0, 32.0, 32.0);
        let wall = field.add_wall(rect, WallKind::Obstacle, Material::Concrete);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();

        for hit in 1..=9 {
            place_bullet(&mut player, Direction::Right, Vec2::new(482.0, 390.0));
            manager.check_all(&mut player, None, &mut field, &mut signals);
            assert_eq!(field.wall(wall).unwrap().health, 10 - hit);
        }
        assert_eq!(manager.stats().wall_destructions, 0);

        place_bullet(&mut player, Direction::Right, Vec2::new(482.0, 390.0));
        manager.check_all(&mut player, None, &mut field, &mut signals);
        assert!(field.wall(wall).is_none());
        assert_eq!(manager.stats().wall_destructions, 1);
        assert_eq!(signals.explosions.last().unwrap().class, ExplosionClass::Large);
    }

    #[test]
    fn test_tank_clamped_into_field() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        player.pos = Vec2::new(-10.0, 590.0);

        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(player.pos, Vec2::new(0.0, 568.0));
        assert_eq!(
            signals.events,
            vec![GameEvent::TankClamped { side: Side::Player }]
        );
    }

    #[test]
    fn test_missing_enemy_skips_duel() {
        let (mut player, _) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(301.0, 210.0));
        manager.check_all(&mut player, None, &mut field, &mut signals);
        assert_eq!(player.bullets().len(), 1);
        assert_eq!(manager.stats(), CollisionStats::default());
    }

    #[test]
    fn test_reset_stats() {
        let (mut player, mut enemy) = tanks();
        let mut field = GameField::empty(arena(), 32.0);
        let mut signals = Signals::default();
        let mut manager = CollisionManager::new();
        place_bullet(&mut player, Direction::Right, Vec2::new(301.0, 210.0));
        manager.check_all(&mut player, Some(&mut enemy), &mut field, &mut signals);
        assert_eq!(manager.stats().total_collisions, 1);
        manager.reset_stats();
        assert_eq!(manager.stats(), CollisionStats::default());
    }
}
