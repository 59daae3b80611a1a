use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use salmon_analyst::{EngineConfig, Search, UciHandler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with engine settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pick the search depth for a player of this rating
    #[arg(long, conflicts_with = "depth")]
    elo: Option<u32>,

    /// Search depth in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Seed for the move shuffler, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();

    // stdout carries protocol output only
    if let Err(e) = run(args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut search = Search::from_config(&config)?;
    if let Some(depth) = args.depth {
        search.set_max_depth(depth);
    }
    if let Some(rating) = args.elo {
        search.set_depth_for_rating(rating);
    }
    info!("searching {} plies deep", search.max_depth());

    UciHandler::new(search).run()
}
