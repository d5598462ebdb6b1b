//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (vector order, newest bullet first in sweeps)
//! - No rendering or platform dependencies

pub mod bullet;
pub mod collision;
pub mod event;
pub mod field;
pub mod geom;
pub mod state;
pub mod tank;
pub mod tick;

pub use bullet::{Bullet, Side};
pub use collision::{CollisionManager, CollisionStats};
pub use event::{Explosion, GameEvent, Signals};
pub use field::{Base, ExplosionClass, GameField, Material, Wall, WallDamage, WallKind};
pub use geom::{Direction, Rect};
pub use state::{GameOverReason, GamePhase, GameState};
pub use tank::{AiSnapshot, AiState, ShootingInfo, Tank, UnitKind};
pub use tick::{TickInput, tick};

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::settings::Settings;
    use proptest::prelude::*;

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(up, down, left, right, shoot)| TickInput {
                up,
                down,
                left,
                right,
                shoot,
                pause: false,
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_tanks_stay_in_bounds(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..300),
        ) {
            let mut state = GameState::new(&Settings::default(), seed);
            state.start();
            let bounds = state.field.bounds();
            for input in &inputs {
                tick(&mut state, input, FRAME_MS);
                prop_assert!(bounds.contains_rect(&state.player.rect()));
                if let Some(enemy) = &state.enemy {
                    prop_assert!(bounds.contains_rect(&enemy.rect()));
                    prop_assert_eq!(enemy.is_alive(), enemy.health() > 0);
                }
                prop_assert!(state.player.health() >= 0);
                prop_assert!(state.player.health() <= state.player.max_health());
                prop_assert_eq!(
                    state.player.is_alive(),
                    state.player.health() > 0
                );
            }
        }

        #[test]
        fn prop_shots_respect_cooldown(
            inputs in prop::collection::vec(any::<bool>(), 1..200),
        ) {
            let settings = Settings::default();
            let field = GameField::empty(settings.field.bounds(), settings.field.tile_size);
            let mut state = GameState::with_field(&settings, 1, field, None);
            let mut last_shot: Option<u64> = None;
            let min_gap = (settings.player.shoot_cooldown_ms / FRAME_MS).floor() as u64;
            for (i, shoot) in inputs.iter().enumerate() {
                let input = TickInput { shoot: *shoot, ..Default::default() };
                tick(&mut state, &input, FRAME_MS);
                let fired = state.take_signals().events.iter().any(|e| matches!(
                    e,
                    GameEvent::BulletFired { side: Side::Player, .. }
                ));
                if fired {
                    if let Some(prev) = last_shot {
                        prop_assert!(i as u64 - prev >= min_gap);
                    }
                    last_shot = Some(i as u64);
                }
            }
        }

        #[test]
        fn prop_bullets_keep_their_heading(
            seed in any::<u64>(),
            frames in 1usize..200,
        ) {
            let mut state = GameState::new(&Settings::default(), seed);
            state.start();
            let fire = TickInput { shoot: true, right: true, ..Default::default() };
            for _ in 0..frames {
                tick(&mut state, &fire, FRAME_MS);
                for bullet in state.player.bullets() {
                    prop_assert_eq!(bullet.direction(), Direction::Right);
                }
            }
        }
    }
}
