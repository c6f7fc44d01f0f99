//! Chess-MCTS command line front end.
//!
//! ## Usage
//!
//! - `chess-mcts` - Show a demo
//! - `chess-mcts search --fen "<fen>" --playouts 2000` - Search one position
//! - `chess-mcts demo` - Run the MCTS demo

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use chess_mcts::config::{PromotionMode, SearchConfig};
use chess_mcts::constants::{DEFAULT_EXPLORATION, DEFAULT_MAX_PLAYOUTS, DEFAULT_PLAYOUT_DEPTH, START_FEN};
use chess_mcts::evaluation::MaterialEvaluator;
use chess_mcts::mcts::{SearchEngine, dump_children};
use chess_mcts::movegen::StandardMoveGenerator;
use chess_mcts::position::Position;
use chess_mcts::search::SearchController;

/// Chess-MCTS: Monte Carlo Tree Search move selection
#[derive(Parser)]
#[command(name = "chess-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one position and print the chosen move
    Search(SearchArgs),
    /// Run a simple demo of the engine
    Demo,
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Position to search
    #[arg(long, default_value = START_FEN)]
    fen: String,

    /// Playout budget
    #[arg(long, default_value_t = DEFAULT_MAX_PLAYOUTS)]
    playouts: u32,

    /// Do not enforce the playout budget (requires --time-ms)
    #[arg(long)]
    unlimited: bool,

    /// Simulated moves per rollout
    #[arg(long, default_value_t = DEFAULT_PLAYOUT_DEPTH)]
    depth: u32,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,

    /// Stop after this many milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Seed for reproducible searches
    #[arg(long)]
    seed: Option<u64>,

    /// Run the search on a worker thread
    #[arg(long)]
    worker: bool,

    /// Promotion pieces considered during expansion
    #[arg(long, value_enum, default_value_t = Promotions::All)]
    promotions: Promotions,
}

#[derive(Clone, Copy, ValueEnum)]
enum Promotions {
    All,
    Queen,
    QueenKnight,
}

impl From<Promotions> for PromotionMode {
    fn from(p: Promotions) -> Self {
        match p {
            Promotions::All => PromotionMode::All,
            Promotions::Queen => PromotionMode::QueenOnly,
            Promotions::QueenKnight => PromotionMode::QueenAndKnight,
        }
    }
}

impl SearchArgs {
    fn to_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default()
            .with_playouts(self.playouts)
            .with_depth(self.depth)
            .with_exploration(self.exploration)
            .with_promotions(self.promotions.into())
            .on_worker_thread(self.worker);
        if self.unlimited {
            config = config.without_playout_limit();
        }
        if let Some(ms) = self.time_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Search(args)) => run_search(&args),
        Some(Commands::Demo) | None => {
            run_demo();
            Ok(())
        }
    }
}

fn run_search(args: &SearchArgs) -> Result<()> {
    let position = Position::from_fen(&args.fen).with_context(|| format!("invalid FEN {:?}", args.fen))?;
    let config = args.to_config();
    info!(fen = %args.fen, "searching");

    let mut controller = SearchController::new(config).context("invalid search configuration")?;
    let outcome = controller.start_search(&position)?.wait()?;

    println!("{position}");
    println!("bestmove {}", outcome.best_move);
    println!("eval {}", outcome.eval);
    println!(
        "playouts {} nodes {} time {}ms",
        outcome.diagnostics.playouts,
        outcome.diagnostics.tree_size,
        outcome.diagnostics.elapsed.as_millis()
    );
    Ok(())
}

fn run_demo() {
    println!("Chess-MCTS: Monte Carlo Tree Search Demo\n");

    let pos = Position::new();
    println!("{pos}");

    let config = SearchConfig::default().with_playouts(400).with_depth(20).with_seed(1);
    let mut engine = SearchEngine::new(
        pos,
        &config,
        &StandardMoveGenerator,
        &MaterialEvaluator,
        config.make_rng(),
    );

    println!("Running {} playouts...", config.max_playouts);
    let outcome = engine.run(&AtomicBool::new(false));
    dump_children(engine.tree());
    println!("Best move: {}", outcome.best_move);
    println!("Eval: {}", outcome.eval);
    println!("Nodes: {}", outcome.diagnostics.tree_size);
}
