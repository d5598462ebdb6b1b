//! Orchestrator
//!
//! Owns the simulation state and the three outside collaborators: a
//! renderer, an input source and an event sink. Each call to
//! [`Game::frame`] runs one fixed cycle:
//!
//! poll input -> restart if requested -> tick -> forward events -> render ->
//! clear one-shot input

use crate::logger::EventSink;
use crate::platform::InputSource;
use crate::renderer::{Renderer, render_frame};
use crate::settings::Settings;
use crate::sim::{CollisionStats, Explosion, GamePhase, GameState, Signals, tick};

pub struct Game<R, I, S> {
    settings: Settings,
    seed: u64,
    state: Option<GameState>,
    renderer: R,
    input: I,
    sink: S,
    /// Explosions raised during the last frame
    explosions: Vec<Explosion>,
    frames: u64,
}

impl<R: Renderer, I: InputSource, S: EventSink> Game<R, I, S> {
    /// Wire up collaborators; the world is built by [`Game::init`]
    pub fn new(settings: Settings, seed: u64, renderer: R, input: I, sink: S) -> Self {
        Self {
            settings: settings.checked(),
            seed,
            state: None,
            renderer,
            input,
            sink,
            explosions: Vec::new(),
            frames: 0,
        }
    }

    /// Build field, player and enemy for the current seed
    pub fn init(&mut self) {
        let state = GameState::new(&self.settings, self.seed);
        self.state = Some(state);
        self.explosions.clear();
        self.sink.log(
            "World initialised",
            crate::LogCategory::Game,
            Some(&format!("seed {}", self.seed)),
        );
    }

    /// Begin play, building the world first if needed
    pub fn start(&mut self) {
        if self.state.is_none() {
            self.init();
        }
        if let Some(state) = self.state.as_mut() {
            state.start();
        }
        self.flush();
    }

    /// Run one frame of `dt` milliseconds
    pub fn frame(&mut self, dt: f32) {
        let snapshot = self.input.poll();
        if snapshot.restart {
            self.restart();
        }

        if let Some(state) = self.state.as_mut() {
            tick(state, &snapshot.tick, dt);
        }
        self.flush();

        if let Some(state) = self.state.as_ref() {
            render_frame(&mut self.renderer, state, &self.explosions);
        }
        self.input.end_frame();
        self.frames += 1;
    }

    pub fn toggle_pause(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.toggle_pause();
        }
        self.flush();
    }

    /// Rebuild the world with the next seed and start immediately
    pub fn restart(&mut self) {
        self.seed = self.seed.wrapping_add(1);
        log::info!("Restarting with seed {}", self.seed);
        self.init();
        self.start();
    }

    /// Forward pending events to the sink and keep explosions for rendering
    fn flush(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let Signals { events, explosions } = state.take_signals();
        for event in &events {
            let (message, category, details) = event.log_entry();
            self.sink.log(&message, category, details.as_deref());
        }
        self.explosions = explosions;
    }

    pub fn phase(&self) -> GamePhase {
        self.state
            .as_ref()
            .map_or(GamePhase::Initializing, |s| s.phase)
    }

    pub fn is_over(&self) -> bool {
        self.phase() == GamePhase::GameOver
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn collision_stats(&self) -> CollisionStats {
        self.state
            .as_ref()
            .map(|s| s.collisions.stats())
            .unwrap_or_default()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
