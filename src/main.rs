//! Volume Keeper entry point
//!
//! Headless runner: plays a full session on autopilot and prints a JSON
//! summary. Usage: `volume-keeper [CONFIG.json] [--seed N]`

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use volume_keeper::audio::{AudioManager, LogBackend};
use volume_keeper::consts::SIM_DT;
use volume_keeper::sim::{GameEvent, GamePhase, SessionStats, TickInput};
use volume_keeper::{ConfigError, Session, WorldConfig};

/// Play a headless Volume Keeper session on autopilot
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World config JSON; defaults apply when omitted
    config: Option<PathBuf>,

    /// Session seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(path: Option<&Path>) -> Result<WorldConfig, ConfigError> {
    match path {
        Some(path) => WorldConfig::load(path),
        None => Ok(WorldConfig::default()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    seed: u64,
    outcome: GamePhase,
    elapsed: f32,
    ticks: u64,
    chaos: f32,
    level: u32,
    kids: usize,
    stats: SessionStats,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Volume Keeper (headless) starting with seed {seed}");

    let mut session = Session::new(config, seed);
    session.set_input(TickInput {
        idle_mode: true,
        ..Default::default()
    });
    let mut audio = AudioManager::new(Some(Box::new(LogBackend)));

    while !session.is_over() {
        session.update(SIM_DT);

        let events = session.drain_events();
        audio.play_events(&events);
        if events.contains(&GameEvent::UpgradeRequested) {
            log::debug!("Level {} reached; auto-picking upgrades", session.state.level);
        }
        while session.awaiting_upgrade() {
            let Some(choice) = session.offer_upgrades().into_iter().next() else {
                break;
            };
            if !session.choose_upgrade(choice) {
                break;
            }
        }
    }

    let state = &session.state;
    let summary = Summary {
        seed,
        outcome: state.phase,
        elapsed: state.elapsed,
        ticks: state.time_ticks,
        chaos: state.chaos,
        level: state.level,
        kids: state.kids.len(),
        stats: state.stats.clone(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize summary: {e}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_config_and_seed() {
        let args = Args::try_parse_from(["volume-keeper", "world.json", "--seed", "42"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("world.json")));
        assert_eq!(args.seed, Some(42));

        let args = Args::try_parse_from(["volume-keeper"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.seed, None);
    }

    #[test]
    fn test_rejects_bad_seed_and_unknown_flags() {
        assert!(Args::try_parse_from(["volume-keeper", "--seed", "lots"]).is_err());
        assert!(Args::try_parse_from(["volume-keeper", "--turbo"]).is_err());
    }
}
