//! Reversi engine command line.
//!
//! Plays matches between the built-in agents, trains an MCTS tree offline,
//! and prints positions.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use reversi::mcts::Tree;
use reversi::{
    play_series, Agent, AlphaBetaAgent, Board, FirstMoveAgent, MatchConfig, MctsAgent,
    MctsConfig, MctsSearcher, RandomAgent, SearchConfig,
};

/// Reversi engine: matches, MCTS training and board inspection.
#[derive(Parser)]
#[command(name = "reversi")]
#[command(about = "Play, train and inspect Reversi agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games between two agents.
    Play {
        /// Agent playing Black in the first game.
        #[arg(long, value_enum, default_value = "alphabeta")]
        first: AgentKind,

        /// Agent playing White in the first game.
        #[arg(long, value_enum, default_value = "mcts")]
        second: AgentKind,

        /// Board edge length (even, 4 to 16).
        #[arg(short, long, default_value = "8")]
        size: usize,

        /// Thinking time per player and per game, in seconds.
        #[arg(short, long, default_value = "20")]
        time: f64,

        /// Number of games; colours alternate between games.
        #[arg(short, long, default_value = "1")]
        games: u32,

        /// Random seed for the random and MCTS agents.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Maximum alpha-beta depth.
        #[arg(long, default_value = "32")]
        depth: i8,

        /// Trained tree the MCTS agents start every game from.
        #[arg(long)]
        tree: Option<PathBuf>,
    },

    /// Train an MCTS tree from the initial position and save it.
    Train {
        /// Number of simulations to run.
        #[arg(short = 'n', long, default_value = "10000")]
        simulations: u64,

        /// Board edge length (even, 4 to 16).
        #[arg(short, long, default_value = "8")]
        size: usize,

        /// Output file (JSON).
        #[arg(short, long, default_value = "mcts_tree.json")]
        output: PathBuf,

        /// Continue training a previously saved tree.
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Random seed.
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print the initial position and its legal moves.
    Show {
        /// Board edge length (even, 4 to 16).
        #[arg(short, long, default_value = "8")]
        size: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentKind {
    Random,
    First,
    Alphabeta,
    Mcts,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            first,
            second,
            size,
            time,
            games,
            seed,
            depth,
            tree,
        } => {
            let opening = tree
                .map(|path| {
                    Tree::load(&path)
                        .with_context(|| format!("failed to load tree from {}", path.display()))
                })
                .transpose()?;
            let config = MatchConfig::default()
                .with_board_size(size)
                .with_time_per_player(Duration::from_secs_f64(time));

            let mut a = build_agent(first, &config, seed, depth, opening.clone());
            let mut b = build_agent(second, &config, seed.wrapping_add(1), depth, opening);

            let series = play_series(a.as_mut(), b.as_mut(), games, &config)
                .context("match aborted")?;

            for (i, game) in series.games.iter().enumerate() {
                println!(
                    "game {}: {:?} ({} black / {} white){}",
                    i + 1,
                    game.outcome,
                    game.black_discs,
                    game.white_discs,
                    game.forfeit
                        .map(|side| format!(", {side:?} forfeited"))
                        .unwrap_or_default()
                );
            }
            println!(
                "{}: {} wins, {}: {} wins, {} ties",
                a.name(),
                series.first_wins,
                b.name(),
                series.second_wins,
                series.ties
            );
        }

        Commands::Train {
            simulations,
            size,
            output,
            resume,
            seed,
        } => {
            let board = Board::new(size).context("invalid board size")?;
            let config = MctsConfig::default().with_seed(seed);
            let mut searcher = match resume {
                Some(path) => MctsSearcher::load(config, &path)
                    .with_context(|| format!("failed to load tree from {}", path.display()))?,
                None => MctsSearcher::new(config),
            };

            let start = Instant::now();
            searcher
                .train(&board, simulations)
                .context("training failed")?;
            searcher
                .save(&output)
                .with_context(|| format!("failed to save tree to {}", output.display()))?;

            let tree = searcher.tree();
            println!(
                "{} simulations in {:.1}s, {} nodes, saved to {}",
                tree.simulations(),
                start.elapsed().as_secs_f64(),
                tree.len(),
                output.display()
            );
            for stats in tree.root_stats() {
                println!(
                    "  {}  visits {:>7}  opponent value {:.3}",
                    stats.mv, stats.visits, stats.opponent_value
                );
            }
        }

        Commands::Show { size } => {
            let board = Board::new(size).context("invalid board size")?;
            println!("{board}");
            let moves: Vec<String> = board
                .legal_moves_to_play()
                .iter()
                .map(|mv| mv.to_string())
                .collect();
            println!("Legal moves: {}", moves.join(" "));
        }
    }

    Ok(())
}

fn build_agent(
    kind: AgentKind,
    config: &MatchConfig,
    seed: u64,
    depth: i8,
    opening: Option<Tree>,
) -> Box<dyn Agent> {
    match kind {
        AgentKind::Random => Box::new(RandomAgent::with_seed(seed)),
        AgentKind::First => Box::new(FirstMoveAgent::new()),
        AgentKind::Alphabeta => Box::new(AlphaBetaAgent::new(
            SearchConfig::default().with_depth(depth),
            config.time_per_player,
        )),
        AgentKind::Mcts => {
            let agent = MctsAgent::new(MctsConfig::default().with_seed(seed), config.time_per_player);
            match opening {
                Some(tree) => Box::new(agent.with_opening_tree(tree)),
                None => Box::new(agent),
            }
        }
    }
}
