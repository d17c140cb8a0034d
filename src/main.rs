use std::path::PathBuf;

use clap::Parser;
use gametree::config::{self, PROFILES_DIR};
use gametree::constants::DEFAULT_TIME_LIMIT_MS;
use gametree::game::mnk::Board;
use gametree::{Engine, Player, SearchConfig, State};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of rows of the board
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Number of columns of the board
    #[arg(long, default_value_t = 3)]
    cols: usize,

    /// Marks in a row needed to win
    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Time budget per move in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MS)]
    time_ms: u64,

    /// Name of a saved search profile to play with
    #[arg(long)]
    profile: Option<String>,

    /// Directory holding the search profiles
    #[arg(long, default_value = PROFILES_DIR)]
    profile_dir: PathBuf,

    /// Log filter, e.g. "debug" or "gametree=trace"; overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Seed for tie-breaking in the immediate search
    #[arg(long)]
    seed: Option<u64>,

    /// Always pick moves with the one-ply immediate search
    #[arg(long)]
    immediate: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    std::panic::set_hook(Box::new(tracing_panic::panic_hook));

    let mut config = match &args.profile {
        Some(name) => config::load_profile(&args.profile_dir, name)?,
        None => SearchConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.immediate {
        config.immediate_search_threshold = 0;
    }

    let board = Board::new(args.rows, args.cols, args.k)?;
    info!(rows = args.rows, cols = args.cols, k = args.k, time_ms = args.time_ms, "starting game");

    let second_config = SearchConfig {
        seed: config.seed.map(|seed| seed.wrapping_add(1)),
        ..config.clone()
    };
    let mut engines = [
        Engine::with_config(Player::P1, board.clone(), args.time_ms, config)?,
        Engine::with_config(Player::P2, board, args.time_ms, second_config)?,
    ];

    println!("{}", engines[0].state());
    while !engines[0].state().is_terminal() {
        let mover = match engines[0].state().player() {
            Player::P1 => 0,
            Player::P2 => 1,
        };
        let action = engines[mover].search()?;
        for engine in engines.iter_mut() {
            engine.update(action)?;
        }

        let stats = engines[mover].last_stats();
        let depth = stats.depth.map_or("-".to_string(), |d| d.to_string());
        println!(
            "{:?} plays {} (depth {}, {} nodes, {} ms)",
            engines[mover].player(),
            action,
            depth,
            stats.nodes,
            stats.elapsed.as_millis()
        );
        println!("{}", engines[0].state());
    }

    match engines[0].state().winner() {
        Some(player) => println!("{player:?} wins"),
        None => println!("Draw"),
    }
    Ok(())
}
