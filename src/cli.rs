use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;

use crate::chemistry::ChemistryState;
use crate::config::Config;
use crate::engine::{ChemistrySimulationEngine, EngineSnapshot};
use crate::interaction::InteractionKind;
use crate::presenter::Presenter;
use crate::recommendation::derive_recommendations;

#[derive(Parser)]
#[command(name = "chemtwin")]
#[command(about = "Digital twin of a simulated dopamine, oxytocin and cortisol chemistry")]
#[command(version)]
pub struct Args {
    /// Directory holding config.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the live simulation and render every tick
    Run {
        /// Stop after this many ticks (runs until Ctrl-C otherwise)
        #[arg(long)]
        ticks: Option<u64>,
        /// Seed for reproducible interaction draws
        #[arg(long)]
        seed: Option<u64>,
        /// Tick period in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Print one JSON snapshot per line instead of the dashboard
        #[arg(long)]
        json: bool,
    },
    /// Apply one interaction deterministically
    Step {
        /// physical_touch, argument, deep_talk or none
        kind: InteractionKind,
        /// Starting levels as dopamine,oxytocin,cortisol
        #[arg(long, default_value = "50,50,20")]
        from: ChemistryState,
        /// Number of times to apply the interaction
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Show recommendations for the given levels
    Recommend {
        /// Levels as dopamine,oxytocin,cortisol
        state: ChemistryState,
    },
    /// Show the effective configuration
    Config,
}

pub async fn handle_run(
    config: &Config,
    ticks: Option<u64>,
    seed: Option<u64>,
    interval_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let seed = seed.or(config.seed);
    let interval = match interval_ms {
        Some(0) => anyhow::bail!("--interval-ms must be greater than zero"),
        Some(ms) => Duration::from_millis(ms),
        None => config.tick_interval(),
    };

    let engine = match seed {
        Some(seed) => ChemistrySimulationEngine::with_seed(seed),
        None => ChemistrySimulationEngine::new(),
    };
    let mut engine = engine.with_interval(interval);
    let mut updates = engine.subscribe();

    engine.start();
    show(&updates.borrow_and_update(), json)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                show(&snapshot, json)?;
                if ticks.is_some_and(|limit| snapshot.ticks >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    engine.stop();
    if !json {
        println!("\n{} after {} ticks", "Stopped".yellow().bold(), engine.ticks());
    }
    Ok(())
}

fn show(snapshot: &EngineSnapshot, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        println!("{}", line);
    } else {
        println!("{}", Presenter::render(snapshot));
    }
    Ok(())
}

pub fn handle_step(kind: InteractionKind, from: ChemistryState, times: u32) -> Result<()> {
    let mut state = from;
    for _ in 0..times {
        state = state.apply(kind);
    }

    println!("{} ×{}", kind.label().cyan().bold(), times);
    println!("  from: {}", from);
    println!("  to:   {}", state);
    println!();
    println!("{}", Presenter::format_levels(&state));
    println!();
    println!("{}", Presenter::format_recommendations(&derive_recommendations(&state)));
    Ok(())
}

pub fn handle_recommend(state: ChemistryState) -> Result<()> {
    println!("{}", state);
    println!("{}", Presenter::format_recommendations(&derive_recommendations(&state)));
    Ok(())
}

pub fn handle_config(config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}: {}", "Config file".cyan(), config.config_file().display());
    println!("{}", json);
    Ok(())
}
