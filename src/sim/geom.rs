//! Axis-aligned geometry for tanks, bullets and walls
//!
//! Everything in the arena is a rectangle in pixel space, with `y` growing
//! downward as on a canvas.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four cardinal facings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in screen space
    pub fn delta(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// up <-> down, left <-> right
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Facing that closes the smaller axis of `delta`, if that axis is open
    pub fn across(delta: Vec2) -> Option<Self> {
        if Direction::toward(delta).is_horizontal() {
            match delta.y {
                y if y > 0.0 => Some(Direction::Down),
                y if y < 0.0 => Some(Direction::Up),
                _ => None,
            }
        } else {
            match delta.x {
                x if x > 0.0 => Some(Direction::Right),
                x if x < 0.0 => Some(Direction::Left),
                _ => None,
            }
        }
    }

    /// Facing that closes the larger axis of `delta` first (ties go vertical)
    pub fn toward(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 { Direction::Right } else { Direction::Left }
        } else if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict AABB overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// True if `inner` lies fully inside this rectangle (edges inclusive)
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        inner.x >= self.min_x()
            && inner.max_x() <= self.max_x()
            && inner.y >= self.min_y()
            && inner.max_y() <= self.max_y()
    }

    /// Point-in-rectangle, edges inclusive
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// This rectangle stretched along `direction` to the far edge of `limit`
    pub fn swept(&self, direction: Direction, limit: &Rect) -> Rect {
        match direction {
            Direction::Up => {
                let top = limit.min_y().min(self.y);
                Rect::new(self.x, top, self.w, self.max_y() - top)
            }
            Direction::Down => {
                let bottom = limit.max_y().max(self.max_y());
                Rect::new(self.x, self.y, self.w, bottom - self.y)
            }
            Direction::Left => {
                let left = limit.min_x().min(self.x);
                Rect::new(left, self.y, self.max_x() - left, self.h)
            }
            Direction::Right => {
                let right = limit.max_x().max(self.max_x());
                Rect::new(self.x, self.y, right - self.x, self.h)
            }
        }
    }

    /// Clamp a rectangle of `size` at `pos` so it fits inside `self`, per axis
    pub fn clamp_pos(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let mut out = pos;
        if out.x < self.min_x() {
            out.x = self.min_x();
        }
        if out.x + size.x > self.max_x() {
            out.x = self.max_x() - size.x;
        }
        if out.y < self.min_y() {
            out.y = self.min_y();
        }
        if out.y + size.y > self.max_y() {
            out.y = self.max_y() - size.y;
        }
        out
    }
}
