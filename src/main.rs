use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use letter_battleship::{
    board::generate_board, init_logging, init_logging_at, ui, Game, GameConfig, RandomActivities,
    Runtime, TiePolicy,
};
use log::LevelFilter;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level regardless of LETTERS_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TieArg {
    Draw,
    FirstFinished,
    SecondPlayer,
}

impl From<TieArg> for TiePolicy {
    fn from(arg: TieArg) -> Self {
        match arg {
            TieArg::Draw => TiePolicy::Draw,
            TieArg::FirstFinished => TiePolicy::FirstFinished,
            TieArg::SecondPlayer => TiePolicy::SecondPlayer,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a match between two computer players.
    Play {
        #[arg(long, help = "Fix RNG seed for reproducible matches (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long)]
        board_size: Option<u8>,
        #[arg(long, value_enum)]
        tie_policy: Option<TieArg>,
        #[arg(long, help = "Stop both players after this many milliseconds")]
        deadline_ms: Option<u64>,
        #[arg(long, help = "Probability that a message is delivered twice")]
        duplicate_rate: Option<f64>,
        #[arg(long, default_value = "letters")]
        game_id: String,
        #[arg(long, help = "Print the outcome as JSON")]
        json: bool,
    },
    /// Generate a board and print it.
    Board {
        #[arg(long, help = "Fix RNG seed for reproducible boards (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long)]
        board_size: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_logging_at(LevelFilter::Debug);
    } else {
        init_logging();
    }

    match cli.command {
        Commands::Play {
            seed,
            board_size,
            tie_policy,
            deadline_ms,
            duplicate_rate,
            game_id,
            json,
        } => {
            let mut config = GameConfig::from_env()?;
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(size) = board_size {
                config.board_size = size;
            }
            if let Some(policy) = tie_policy {
                config.tie_policy = policy.into();
            }
            if let Some(ms) = deadline_ms {
                config.match_deadline = Some(Duration::from_millis(ms));
            }
            if let Some(rate) = duplicate_rate {
                config.duplicate_delivery = rate;
            }
            config.validate()?;
            if let Some(s) = config.seed {
                log::info!("Using fixed seed: {} (match will be reproducible)", s);
            }

            let activities = Arc::new(RandomActivities::new(config.seed));
            let game = Game::new(Runtime::new(config, activities), game_id);

            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, stopping the match");
                    interrupt.cancel();
                }
            });

            let outcome = game.run_with_cancel(cancel).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", ui::render_outcome(&outcome));
            }
        }
        Commands::Board { seed, board_size } => {
            let mut config = GameConfig::from_env()?;
            if let Some(size) = board_size {
                config.board_size = size;
            }
            config.validate()?;
            let mut rng = if let Some(s) = seed.or(config.seed) {
                SmallRng::seed_from_u64(s)
            } else {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            };
            let board = generate_board(&mut rng, config.board_size, &config.pieces)?;
            print!("{}", ui::render_board(&board));
        }
    }
    Ok(())
}
