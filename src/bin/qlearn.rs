//! qlearn CLI - Online Q-learning agents from the command line
//!
//! This CLI provides a unified interface for:
//! - Training an agent on the grid world
//! - Learning next-letter transitions and generating words
//! - Training, teaching and saving Q&A chatbots

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qlearn")]
#[command(version, about = "Online Q-learning agents with a growable action space", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a 4×4 grid to its goal cell
    Grid(qlearn::cli::commands::grid::GridArgs),

    /// Learn next-letter transitions and generate words
    Text(qlearn::cli::commands::text::TextArgs),

    /// Train a chatbot on a question/answer corpus
    Chat(Box<qlearn::cli::commands::chat::ChatArgs>),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Grid(args) => qlearn::cli::commands::grid::execute(args),
        Commands::Text(args) => qlearn::cli::commands::text::execute(args),
        Commands::Chat(args) => qlearn::cli::commands::chat::execute(*args),
    }
}
