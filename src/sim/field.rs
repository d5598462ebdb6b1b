//! The arena: bounds, destructible walls and the headquarters
//!
//! Walls sit on a tile grid. The perimeter is tiled once per cell with
//! concrete; interior obstacles are placed at random distinct cells with a
//! weighted material roll. Layout is computed once at construction.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::settings::FieldSettings;

/// Wall material, which fixes hit points and explosion size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Wood,
    Brick,
    Concrete,
}

impl Material {
    /// Hit points of a fresh wall
    pub fn max_health(self) -> i32 {
        match self {
            Material::Wood => 1,
            Material::Brick => 3,
            Material::Concrete => 10,
        }
    }

    pub fn explosion(self) -> ExplosionClass {
        match self {
            Material::Wood => ExplosionClass::Small,
            Material::Brick => ExplosionClass::Medium,
            Material::Concrete => ExplosionClass::Large,
        }
    }

    /// Weighted roll: wood 50%, brick 30%, concrete 20%
    pub fn roll(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..10) {
            0..=4 => Material::Wood,
            5..=7 => Material::Brick,
            _ => Material::Concrete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Brick => "brick",
            Material::Concrete => "concrete",
        }
    }
}

/// Visual size class of an explosion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionClass {
    Small,
    Medium,
    Large,
}

impl ExplosionClass {
    /// Name of the visual effect ("wall", "armor", "tank")
    pub fn as_str(self) -> &'static str {
        match self {
            ExplosionClass::Small => "wall",
            ExplosionClass::Medium => "armor",
            ExplosionClass::Large => "tank",
        }
    }

    /// Radius multiplier applied by renderers
    pub fn scale(self) -> f32 {
        match self {
            ExplosionClass::Small => 0.8,
            ExplosionClass::Medium => 1.2,
            ExplosionClass::Large => 1.8,
        }
    }
}

/// Whether a wall tiles the perimeter or stands inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    Border,
    Obstacle,
}

/// A grid-aligned destructible wall
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: u32,
    pub rect: Rect,
    pub kind: WallKind,
    pub material: Material,
    pub health: i32,
    pub max_health: i32,
}

impl Wall {
    pub fn new(id: u32, rect: Rect, kind: WallKind, material: Material) -> Self {
        Self {
            id,
            rect,
            kind,
            material,
            health: material.max_health(),
            max_health: material.max_health(),
        }
    }

    pub fn explosion(&self) -> ExplosionClass {
        self.material.explosion()
    }
}

/// Outcome of damaging a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallDamage {
    /// Health went down but the wall stands
    Damaged { health: i32 },
    /// Health reached zero; the wall was removed
    Destroyed,
    /// No wall with that id (already removed)
    Missing,
}

/// The headquarters
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub rect: Rect,
    destroyed: bool,
}

impl Base {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            destroyed: false,
        }
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

/// Static arena: bounds, walls and the base
#[derive(Debug, Clone)]
pub struct GameField {
    bounds: Rect,
    tile_size: f32,
    walls: Vec<Wall>,
    base: Option<Base>,
    next_wall_id: u32,
}

impl GameField {
    /// Build the arena; `reserved` rectangles (tank spawns) get no obstacles
    pub fn generate(settings: &FieldSettings, reserved: &[Rect], rng: &mut impl Rng) -> Self {
        let mut field = Self::empty(settings.bounds(), settings.tile_size);
        field.base = Some(Base::new(settings.base_rect()));
        field.create_border_walls();
        field.create_obstacles(settings.interior_walls, reserved, rng);
        log::info!(
            "Field generated: {} walls ({} interior), base at {:?}",
            field.walls.len(),
            field.walls.iter().filter(|w| w.kind == WallKind::Obstacle).count(),
            settings.base_center
        );
        field
    }

    /// Open arena with no walls and no base
    pub fn empty(bounds: Rect, tile_size: f32) -> Self {
        Self {
            bounds,
            tile_size,
            walls: Vec::new(),
            base: None,
            next_wall_id: 1,
        }
    }

    /// Open arena with a base but no walls
    pub fn with_base(bounds: Rect, tile_size: f32, base: Rect) -> Self {
        let mut field = Self::empty(bounds, tile_size);
        field.base = Some(Base::new(base));
        field
    }

    fn grid(&self) -> (u32, u32) {
        if self.tile_size <= 0.0 {
            return (0, 0);
        }
        (
            (self.bounds.w / self.tile_size).floor() as u32,
            (self.bounds.h / self.tile_size).floor() as u32,
        )
    }

    fn cell_rect(&self, col: u32, row: u32) -> Rect {
        Rect::new(
            self.bounds.x + col as f32 * self.tile_size,
            self.bounds.y + row as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Add a wall and return its id
    pub fn add_wall(&mut self, rect: Rect, kind: WallKind, material: Material) -> u32 {
        let id = self.next_wall_id;
        self.next_wall_id += 1;
        self.walls.push(Wall::new(id, rect, kind, material));
        id
    }

    /// One concrete tile per perimeter cell
    fn create_border_walls(&mut self) {
        let (cols, rows) = self.grid();
        if cols == 0 || rows == 0 {
            return;
        }
        for col in 0..cols {
            self.add_wall(self.cell_rect(col, 0), WallKind::Border, Material::Concrete);
            if rows > 1 {
                self.add_wall(self.cell_rect(col, rows - 1), WallKind::Border, Material::Concrete);
            }
        }
        for row in 1..rows.saturating_sub(1) {
            self.add_wall(self.cell_rect(0, row), WallKind::Border, Material::Concrete);
            if cols > 1 {
                self.add_wall(self.cell_rect(cols - 1, row), WallKind::Border, Material::Concrete);
            }
        }
    }

    /// Random obstacles on distinct interior cells, skipping the base and `reserved`
    fn create_obstacles(&mut self, count: u32, reserved: &[Rect], rng: &mut impl Rng) {
        let (cols, rows) = self.grid();
        let base_rect = self.base.as_ref().map(|b| b.rect);

        let mut cells: Vec<Rect> = (1..rows.saturating_sub(1))
            .flat_map(|row| (1..cols.saturating_sub(1)).map(move |col| (col, row)))
            .map(|(col, row)| self.cell_rect(col, row))
            .filter(|cell| !base_rect.is_some_and(|b| b.overlaps(cell)))
            .filter(|cell| !reserved.iter().any(|r| r.overlaps(cell)))
            .collect();

        cells.shuffle(rng);
        if (count as usize) > cells.len() {
            log::warn!("Only {} free cells for {} obstacle walls", cells.len(), count);
        }
        for cell in cells.into_iter().take(count as usize) {
            let material = Material::roll(rng);
            self.add_wall(cell, WallKind::Obstacle, material);
        }
    }

    /// Per-tick hook; the arena is static for now
    pub fn update(&mut self, _dt: f32) {}

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn base(&self) -> Option<&Base> {
        self.base.as_ref()
    }

    pub fn wall(&self, id: u32) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    /// Wall containing a point, if any
    pub fn wall_at(&self, p: Vec2) -> Option<&Wall> {
        self.walls.iter().find(|w| w.rect.contains_point(p))
    }

    pub fn collides_with_walls(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|w| w.rect.overlaps(rect))
    }

    /// Subtract `amount` from a wall; remove it once health reaches zero
    pub fn damage_wall(&mut self, id: u32, amount: i32) -> WallDamage {
        let Some(index) = self.walls.iter().position(|w| w.id == id) else {
            return WallDamage::Missing;
        };
        let wall = &mut self.walls[index];
        wall.health -= amount;
        if wall.health <= 0 {
            let wall = self.walls.remove(index);
            log::debug!("Wall {} ({}) destroyed", wall.id, wall.material.as_str());
            WallDamage::Destroyed
        } else {
            WallDamage::Damaged {
                health: wall.health,
            }
        }
    }

    /// Mark the base destroyed; idempotent. Returns true on the first call.
    pub fn destroy_base(&mut self) -> bool {
        match self.base.as_mut() {
            Some(base) if !base.destroyed => {
                base.destroyed = true;
                log::info!("Base destroyed");
                true
            }
            _ => false,
        }
    }

    pub fn is_base_destroyed(&self) -> bool {
        self.base.as_ref().is_some_and(|b| b.destroyed)
    }
}
