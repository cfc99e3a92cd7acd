//! sl-sim — slot RTP simulator
//!
//! Usage:
//!   sl-sim --config game.json --trials 1000000
//!   sl-sim --config game.json --trials 500000 --save run.json
//!   sl-sim --config game.json --trials 500000 --resume run.json --save run.json
//!   sl-sim --config game.yaml --session --seed 7

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sl_engine::{
    EngineOptions, GameConfig, GameDefinition, SessionOptions, SlotEngine, WildLineRule,
};
use sl_sim::{Accumulator, SimulationConfig, Simulator};

#[derive(Parser)]
#[command(name = "sl-sim", about = "Monte Carlo RTP simulation for reel slot games")]
struct Cli {
    /// Game configuration (.json, .yaml or .yml)
    #[arg(short, long)]
    config: PathBuf,

    /// Number of trials (sessions) to simulate
    #[arg(short, long, default_value_t = 100_000)]
    trials: u64,

    /// Bet per trial
    #[arg(short, long, default_value_t = 1.0)]
    bet: f64,

    /// Worker threads (0 = CPU count minus two)
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Saved accumulator to continue from
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write the combined accumulator here when done
    #[arg(long)]
    save: Option<PathBuf>,

    /// Play and print a single recorded session instead of simulating
    #[arg(long)]
    session: bool,

    /// Anchor wild-led lines on the wild itself instead of the first non-wild
    #[arg(long)]
    literal_wilds: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let game = Arc::new(load_game(&cli.config)?);
    let engine_options = EngineOptions {
        wild_line_rule: if cli.literal_wilds {
            WildLineRule::Literal
        } else {
            WildLineRule::Substitute
        },
        ..EngineOptions::default()
    };

    if cli.session {
        return play_session(game, &cli, engine_options);
    }

    let mut config = SimulationConfig::default()
        .with_trials(cli.trials)
        .with_bet(cli.bet)
        .with_workers(cli.workers)
        .with_engine_options(engine_options);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let prior = cli.resume.as_deref().map(load_accumulator).transpose()?;
    if let Some(prior) = &prior {
        log::info!("Resuming from {} completed trials", prior.total_trials);
    }

    let summary = Simulator::new(game, config).run(prior)?;

    if let Some(path) = &cli.save {
        let json = serde_json::to_string_pretty(&summary.accumulator)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved accumulator to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&summary.report)?);
    println!("{}", summary.report);
    if summary.failed_workers > 0 {
        eprintln!(
            "warning: {} of {} workers failed",
            summary.failed_workers, summary.workers
        );
    }
    Ok(())
}

fn play_session(game: Arc<GameDefinition>, cli: &Cli, options: EngineOptions) -> Result<()> {
    let mut engine = SlotEngine::new(game).with_options(options);
    if let Some(seed) = cli.seed {
        engine.seed(seed);
    }
    let result = engine.play_session(cli.bet, SessionOptions::recorded());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_game(path: &Path) -> Result<GameDefinition> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => GameConfig::from_yaml(&text),
        _ => GameConfig::from_json(&text),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;
    let game = config
        .build()
        .with_context(|| format!("Invalid game configuration in {}", path.display()))?;
    Ok(game)
}

fn load_accumulator(path: &Path) -> Result<Accumulator> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
