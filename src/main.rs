use clap::Parser;
use tracing_subscriber::EnvFilter;

use chemtwin::cli::{self, Args, Commands};
use chemtwin::Config;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::new(args.data_dir.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Config error: {:#}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !config.color {
        colored::control::set_override(false);
    }

    let result = match args.command {
        Commands::Run {
            ticks,
            seed,
            interval_ms,
            json,
        } => cli::handle_run(&config, ticks, seed, interval_ms, json).await,
        Commands::Step { kind, from, times } => cli::handle_step(kind, from, times),
        Commands::Recommend { state } => cli::handle_recommend(state),
        Commands::Config => cli::handle_config(&config),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}
