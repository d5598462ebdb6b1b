//! Tank Battle headless runner
//!
//! Plays a scripted match and prints the final text frame plus a summary.
//!
//! ```text
//! tank-battle [--seed N] [--frames N] [--difficulty easy|normal|hard]
//!             [--settings PATH] [--script STEPS] [--print-every N]
//! ```
//!
//! `TANK_BATTLE_SETTINGS` names a settings file when `--settings` is absent.

use std::error::Error;

use thiserror::Error;

use tank_battle::consts::FRAME_MS;
use tank_battle::platform::ScriptedInput;
use tank_battle::renderer::AsciiRenderer;
use tank_battle::{Difficulty, Game, LogSink, Settings};

const SETTINGS_ENV: &str = "TANK_BATTLE_SETTINGS";

const DEMO_SCRIPT: &str = "right+shoot:60,down+shoot:90,right+shoot:60,idle:30,\
                           pause,idle:20,pause,left+shoot:120,up+shoot:60";

#[derive(Debug, Error)]
enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value `{value}` for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
}

#[derive(Debug)]
struct Args {
    seed: u64,
    frames: u32,
    difficulty: Option<Difficulty>,
    settings: Option<String>,
    script: String,
    print_every: Option<u32>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            seed: 1,
            frames: 600,
            difficulty: None,
            settings: None,
            script: DEMO_SCRIPT.to_string(),
            print_every: None,
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, CliError> {
    let mut out = Args::default();
    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| CliError::MissingValue(flag.clone()));
        let invalid = |v: &str| CliError::InvalidValue {
            flag: flag.clone(),
            value: v.to_string(),
        };
        match flag.as_str() {
            "--seed" => {
                let v = value()?;
                out.seed = v.parse().map_err(|_| invalid(&v))?;
            }
            "--frames" => {
                let v = value()?;
                out.frames = v.parse().map_err(|_| invalid(&v))?;
            }
            "--difficulty" => {
                let v = value()?;
                out.difficulty = Some(Difficulty::parse(&v).ok_or_else(|| invalid(&v))?);
            }
            "--settings" => out.settings = Some(value()?),
            "--script" => out.script = value()?,
            "--print-every" => {
                let v = value()?;
                out.print_every = Some(v.parse().map_err(|_| invalid(&v))?);
            }
            _ => return Err(CliError::UnknownArgument(flag)),
        }
    }
    Ok(out)
}

/// Settings file if one is named and loads, otherwise defaults
fn load_settings(args: &Args) -> Settings {
    let path = args
        .settings
        .clone()
        .or_else(|| std::env::var(SETTINGS_ENV).ok());
    let mut settings = match path {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            log::error!("Failed to load settings from {path}: {e}; using defaults");
            Settings::default()
        }),
        None => Settings::default(),
    };
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    settings
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tank_battle=info"))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let settings = load_settings(&args);
    let input = ScriptedInput::parse(&args.script)?;
    log::info!(
        "Tank Battle (headless): seed {}, {} frames, {} scripted",
        args.seed,
        args.frames,
        input.len()
    );

    let mut game = Game::new(settings, args.seed, AsciiRenderer::default(), input, LogSink);
    game.start();
    for frame in 1..=args.frames {
        game.frame(FRAME_MS);
        if let Some(every) = args.print_every
            && every > 0
            && frame % every == 0
        {
            println!("{}", game.renderer().frame());
        }
        if game.is_over() {
            break;
        }
    }

    println!("{}", game.renderer().frame());
    println!("frames: {}", game.frames());
    println!("phase: {:?}", game.phase());
    println!("collisions: {}", serde_json::to_string(&game.collision_stats())?);
    if let Some(state) = game.state() {
        println!(
            "player: lives {}/{}, health {}",
            state.player.lives(),
            state.player.max_lives(),
            state.player.health()
        );
        if let Some(enemy) = &state.enemy {
            println!(
                "enemy: health {}, ai {}",
                enemy.health(),
                serde_json::to_string(&enemy.ai_snapshot())?
            );
        }
    }
    Ok(())
}
