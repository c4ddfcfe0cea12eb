use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "spinroom", version, about = "Spinroom slot machine CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the reels (consumes one spin from the allowance)
    Spin,
    /// Print the current allowance as JSON
    Status,
    /// Show the cooldown countdown until spins are available again
    Watch,
    /// Recent spins, newest first
    History {
        /// Number of spins to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Spin statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Spin => commands::spin::run(),
        Commands::Status => commands::spin::status(),
        Commands::Watch => commands::watch::run().await,
        Commands::History { limit } => commands::history::run(limit),
        Commands::Stats => commands::history::stats(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
