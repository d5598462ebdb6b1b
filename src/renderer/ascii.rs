//! Text-grid renderer for terminals and headless runs

use glam::Vec2;

use super::{Hud, Renderer};
use crate::sim::{Base, Bullet, Direction, Explosion, Material, Rect, Side, Tank, Wall};

/// Pixels per character cell
pub const DEFAULT_CELL: f32 = 16.0;

/// Rasterises each frame into a grid of characters
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    cell: f32,
    cols: usize,
    rows: usize,
    grid: Vec<char>,
    hud: Vec<String>,
    frames: u64,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CELL)
    }
}

impl AsciiRenderer {
    pub fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(1.0),
            cols: 0,
            rows: 0,
            grid: Vec::new(),
            hud: Vec::new(),
            frames: 0,
        }
    }

    /// Frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last completed frame: grid rows followed by HUD lines
    pub fn frame(&self) -> String {
        let mut out = String::with_capacity((self.cols + 1) * self.rows + 128);
        for row in self.grid.chunks(self.cols.max(1)) {
            out.extend(row.iter());
            out.push('\n');
        }
        for line in &self.hud {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn fill(&mut self, rect: &Rect, ch: char) {
        if self.cols == 0 || self.rows == 0 {
            return;
        }
        let to_col = |x: f32| ((x / self.cell).floor().max(0.0) as usize).min(self.cols - 1);
        let to_row = |y: f32| ((y / self.cell).floor().max(0.0) as usize).min(self.rows - 1);
        let (c0, c1) = (to_col(rect.min_x()), to_col((rect.max_x() - 0.01).max(rect.min_x())));
        let (r0, r1) = (to_row(rect.min_y()), to_row((rect.max_y() - 0.01).max(rect.min_y())));
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.grid[row * self.cols + col] = ch;
            }
        }
    }

    fn plot(&mut self, p: Vec2, ch: char) {
        self.fill(&Rect::new(p.x, p.y, 0.0, 0.0), ch);
    }
}

fn wall_char(material: Material) -> char {
    match material {
        Material::Wood => '%',
        Material::Brick => '=',
        Material::Concrete => '#',
    }
}

fn facing_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

impl Renderer for AsciiRenderer {
    fn begin_frame(&mut self, size: Vec2) {
        self.cols = (size.x / self.cell).ceil().max(1.0) as usize;
        self.rows = (size.y / self.cell).ceil().max(1.0) as usize;
        self.grid.clear();
        self.grid.resize(self.cols * self.rows, ' ');
        self.hud.clear();
    }

    fn draw_wall(&mut self, wall: &Wall) {
        self.fill(&wall.rect, wall_char(wall.material));
    }

    fn draw_base(&mut self, base: &Base) {
        let ch = if base.is_destroyed() { 'x' } else { 'H' };
        self.fill(&base.rect, ch);
    }

    fn draw_tank(&mut self, tank: &Tank) {
        let body = match tank.side() {
            Side::Player => 'P',
            Side::Enemy => 'E',
        };
        self.fill(&tank.rect(), body);
        self.plot(tank.center(), facing_char(tank.direction));
    }

    fn draw_respawn_placeholder(&mut self, pos: Vec2, size: Vec2, _remaining_ms: f32) {
        self.fill(&Rect::from_pos_size(pos, size), '?');
    }

    fn draw_bullet(&mut self, bullet: &Bullet) {
        let ch = match bullet.owner {
            Side::Player => '.',
            Side::Enemy => '*',
        };
        self.plot(bullet.rect().center(), ch);
    }

    fn draw_explosion(&mut self, explosion: &Explosion) {
        let size = Vec2::splat(self.cell * explosion.class.scale());
        self.fill(&Rect::centered(explosion.pos, size), '@');
    }

    fn draw_hud(&mut self, hud: &Hud) {
        let enemy = match (hud.enemy_health, hud.enemy_state) {
            (Some(health), Some(state)) => format!("{health} ({})", state.as_str()),
            (Some(health), None) => health.to_string(),
            _ => "-".to_string(),
        };
        self.hud.push(format!(
            "lives {}/{}  health {}  enemy {}  tick {}",
            hud.lives, hud.max_lives, hud.player_health, enemy, hud.ticks
        ));
        if let Some(reason) = hud.game_over {
            self.hud.push(format!("GAME OVER: {}", reason.as_str()));
        } else if hud.phase == crate::sim::GamePhase::Paused {
            self.hud.push("PAUSED".to_string());
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::render_frame;
    use crate::settings::Settings;
    use crate::sim::{ExplosionClass, GameField, GameState};

    #[test]
    fn test_frame_layout() {
        let state = GameState::new(&Settings::default(), 9);
        let mut renderer = AsciiRenderer::default();
        render_frame(&mut renderer, &state, &[]);
        let frame = renderer.frame();
        let lines: Vec<&str> = frame.lines().collect();
        // 600 / 16 rows of 800 / 16 columns, then the HUD
        assert_eq!(lines.len(), 38 + 1);
        assert!(lines[..38].iter().all(|l| l.chars().count() == 50));
        assert!(lines[0].starts_with("##"));
        assert!(frame.contains('P'));
        assert!(frame.contains('E'));
        assert!(frame.contains('H'));
        assert!(lines[38].starts_with("lives 3/3"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_explosion_size_follows_class() {
        let state = GameState::with_field(
            &Settings::default(),
            1,
            GameField::empty(Rect::new(0.0, 0.0, 800.0, 600.0), 32.0),
            None,
        );
        let count = |class| {
            let mut renderer = AsciiRenderer::default();
            let blast = Explosion {
                pos: Vec2::new(408.0, 408.0),
                class,
            };
            render_frame(&mut renderer, &state, &[blast]);
            renderer.frame().matches('@').count()
        };
        assert_eq!(count(ExplosionClass::Small), 1);
        assert_eq!(count(ExplosionClass::Medium), 4);
        assert_eq!(count(ExplosionClass::Large), 9);
    }

    #[test]
    fn test_tank_facing_marker() {
        let state = GameState::new(&Settings::default(), 9);
        let mut renderer = AsciiRenderer::default();
        render_frame(&mut renderer, &state, &[]);
        // Player spawns facing up at (100, 100): centre cell (7, 7)
        let frame = renderer.frame();
        let row: Vec<char> = frame.lines().nth(7).unwrap().chars().collect();
        assert_eq!(row[7], '^');
    }
}
