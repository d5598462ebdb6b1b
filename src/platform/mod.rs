//! Platform abstraction layer
//!
//! Input arrives from outside the simulation: a real keyboard feeding key
//! names, or a prerecorded script for headless runs. Both implement
//! [`InputSource`], which the orchestrator polls once per frame.

use thiserror::Error;

use crate::sim::TickInput;

/// Everything the orchestrator needs from input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub tick: TickInput,
    /// Rebuild the world with a fresh seed
    pub restart: bool,
}

/// Per-frame input provider
pub trait InputSource {
    /// Input to apply this frame
    fn poll(&mut self) -> InputSnapshot;

    /// Clear one-shot flags after the frame has consumed them
    fn end_frame(&mut self) {}
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn poll(&mut self) -> InputSnapshot {
        (**self).poll()
    }

    fn end_frame(&mut self) {
        (**self).end_frame()
    }
}

/// Logical action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Up,
    Down,
    Left,
    Right,
    Shoot,
    Pause,
    Restart,
}

/// Map a browser-style key name to an action
pub fn map_key(key: &str) -> Option<KeyAction> {
    match key {
        "w" | "W" | "ArrowUp" => Some(KeyAction::Up),
        "s" | "S" | "ArrowDown" => Some(KeyAction::Down),
        "a" | "A" | "ArrowLeft" => Some(KeyAction::Left),
        "d" | "D" | "ArrowRight" => Some(KeyAction::Right),
        " " | "Space" => Some(KeyAction::Shoot),
        "p" | "P" | "Escape" => Some(KeyAction::Pause),
        "r" | "R" => Some(KeyAction::Restart),
        _ => None,
    }
}

/// Held keys plus flags for keys pressed since the last frame
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    shoot_held: bool,
    shoot_pressed: bool,
    pause_pressed: bool,
    restart_pressed: bool,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(action) = map_key(key) else {
            return false;
        };
        match action {
            KeyAction::Up => self.up = true,
            KeyAction::Down => self.down = true,
            KeyAction::Left => self.left = true,
            KeyAction::Right => self.right = true,
            KeyAction::Shoot => {
                self.shoot_held = true;
                self.shoot_pressed = true;
            }
            KeyAction::Pause => self.pause_pressed = true,
            KeyAction::Restart => self.restart_pressed = true,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        let Some(action) = map_key(key) else {
            return false;
        };
        match action {
            KeyAction::Up => self.up = false,
            KeyAction::Down => self.down = false,
            KeyAction::Left => self.left = false,
            KeyAction::Right => self.right = false,
            KeyAction::Shoot => self.shoot_held = false,
            KeyAction::Pause | KeyAction::Restart => {}
        }
        true
    }

    /// Window lost focus: release everything
    pub fn blur(&mut self) {
        *self = Self::default();
    }
}

impl InputSource for KeyboardState {
    fn poll(&mut self) -> InputSnapshot {
        InputSnapshot {
            tick: TickInput {
                up: self.up,
                down: self.down,
                left: self.left,
                right: self.right,
                shoot: self.shoot_held || self.shoot_pressed,
                pause: self.pause_pressed,
            },
            restart: self.restart_pressed,
        }
    }

    fn end_frame(&mut self) {
        self.shoot_pressed = false;
        self.pause_pressed = false;
        self.restart_pressed = false;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("empty step at position {0}")]
    EmptyStep(usize),
    #[error("unknown action `{action}` in step {step}")]
    UnknownAction { step: usize, action: String },
    #[error("bad frame count `{count}` in step {step}")]
    BadCount { step: usize, count: String },
}

/// One scripted stretch of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    pub input: InputSnapshot,
    pub frames: u32,
}

/// Replays a fixed input sequence, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    step: usize,
    frame_in_step: u32,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            step: 0,
            frame_in_step: 0,
        }
    }

    /// Parse `right+shoot:40,down:20,idle:10,pause:1`.
    ///
    /// Each comma-separated step is `+`-joined actions (`up`, `down`,
    /// `left`, `right`, `shoot`, `pause`, `restart` or `idle`) with an
    /// optional frame count, default 1.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        for (index, raw) in script.split(',').enumerate() {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(ScriptError::EmptyStep(index));
            }
            let (actions, frames) = match raw.split_once(':') {
                Some((actions, count)) => {
                    let frames = count.trim().parse::<u32>().map_err(|_| ScriptError::BadCount {
                        step: index,
                        count: count.to_string(),
                    })?;
                    (actions, frames)
                }
                None => (raw, 1),
            };
            let mut input = InputSnapshot::default();
            for action in actions.split('+').map(str::trim) {
                match action {
                    "up" => input.tick.up = true,
                    "down" => input.tick.down = true,
                    "left" => input.tick.left = true,
                    "right" => input.tick.right = true,
                    "shoot" => input.tick.shoot = true,
                    "pause" => input.tick.pause = true,
                    "restart" => input.restart = true,
                    "idle" => {}
                    other => {
                        return Err(ScriptError::UnknownAction {
                            step: index,
                            action: other.to_string(),
                        });
                    }
                }
            }
            steps.push(ScriptStep { input, frames });
        }
        Ok(Self::new(steps))
    }

    /// Total scripted frames
    pub fn len(&self) -> u32 {
        self.steps.iter().map(|s| s.frames).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps.len()
    }

    fn skip_empty_steps(&mut self) {
        while self
            .steps
            .get(self.step)
            .is_some_and(|s| self.frame_in_step >= s.frames)
        {
            self.step += 1;
            self.frame_in_step = 0;
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.skip_empty_steps();
        self.steps
            .get(self.step)
            .map(|s| s.input)
            .unwrap_or_default()
    }

    fn end_frame(&mut self) {
        self.skip_empty_steps();
        if self.step < self.steps.len() {
            self.frame_in_step += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key("ArrowUp"), Some(KeyAction::Up));
        assert_eq!(map_key("W"), Some(KeyAction::Up));
        assert_eq!(map_key(" "), Some(KeyAction::Shoot));
        assert_eq!(map_key("Escape"), Some(KeyAction::Pause));
        assert_eq!(map_key("r"), Some(KeyAction::Restart));
        assert_eq!(map_key("x"), None);
    }

    #[test]
    fn test_one_shot_flags_clear_after_frame() {
        let mut keys = KeyboardState::new();
        keys.key_down("p");
        keys.key_down(" ");
        keys.key_up(" ");
        let snap = keys.poll();
        assert!(snap.tick.pause);
        // Tapped between frames still fires once
        assert!(snap.tick.shoot);
        keys.end_frame();
        let snap = keys.poll();
        assert!(!snap.tick.pause);
        assert!(!snap.tick.shoot);
    }

    #[test]
    fn test_held_keys_persist_until_release() {
        let mut keys = KeyboardState::new();
        keys.key_down("ArrowLeft");
        keys.end_frame();
        assert!(keys.poll().tick.left);
        keys.key_up("ArrowLeft");
        assert!(!keys.poll().tick.left);
    }

    #[test]
    fn test_blur_releases_everything() {
        let mut keys = KeyboardState::new();
        keys.key_down("d");
        keys.key_down(" ");
        keys.blur();
        assert_eq!(keys.poll(), InputSnapshot::default());
    }

    #[test]
    fn test_script_parse_and_replay() {
        let mut script = ScriptedInput::parse("right+shoot:2, idle, pause").unwrap();
        assert_eq!(script.len(), 4);

        let mut frames = Vec::new();
        for _ in 0..6 {
            frames.push(script.poll());
            script.end_frame();
        }
        assert!(frames[0].tick.right && frames[0].tick.shoot);
        assert!(frames[1].tick.right);
        assert_eq!(frames[2], InputSnapshot::default());
        assert!(frames[3].tick.pause);
        assert_eq!(frames[4], InputSnapshot::default());
        assert!(script.is_finished());
    }

    #[test]
    fn test_script_errors() {
        assert_eq!(
            ScriptedInput::parse("up:x").unwrap_err(),
            ScriptError::BadCount {
                step: 0,
                count: "x".to_string()
            }
        );
        assert!(matches!(
            ScriptedInput::parse("up,jump").unwrap_err(),
            ScriptError::UnknownAction { step: 1, .. }
        ));
        assert_eq!(ScriptedInput::parse("up,,down").unwrap_err(), ScriptError::EmptyStep(1));
    }

    #[test]
    fn test_zero_length_steps_are_skipped() {
        let mut script = ScriptedInput::parse("up:0,down:1").unwrap();
        assert!(script.poll().tick.down);
    }
}
