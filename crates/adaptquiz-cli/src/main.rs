//! adaptquiz CLI: adaptive quiz sessions in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "adaptquiz", version, about = "Adaptive quiz sessions with difficulty recalibration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the categories in a bank
    Categories {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Play an interactive quiz session
    Play {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,

        /// Category to draw questions from
        #[arg(long, default_value = "All")]
        category: String,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a scripted learner through a session
    Simulate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,

        /// Category to draw questions from
        #[arg(long, default_value = "All")]
        category: String,

        /// Seed for the session and the learner
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Probability the learner knows an answer
        #[arg(long, default_value = "0.7")]
        accuracy: f64,

        /// Output directory for the JSON summary
        #[arg(long, default_value = "./adaptquiz-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("adaptquiz_core=info,adaptquiz_runtime=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Categories { bank } => commands::categories::execute(bank),
        Commands::Play {
            bank,
            category,
            seed,
            config,
        } => commands::play::execute(bank, category, seed, config).await,
        Commands::Simulate {
            bank,
            category,
            seed,
            accuracy,
            output,
            config,
        } => commands::simulate::execute(bank, category, seed, accuracy, output, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
