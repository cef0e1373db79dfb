mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shortlist::config::ShortlistConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shortlist", version, about = "Assessment recommender over a fixed catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank catalog items against a free-text hiring query
    Search {
        /// The query text, e.g. "java developer test"
        query: String,
        /// Number of results to return (defaults to the configured value)
        #[arg(long)]
        top_k: Option<usize>,
        /// Print results as JSON instead of a numbered list
        #[arg(long)]
        json: bool,
    },
    /// Manage the embedding index
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum IndexAction {
    /// Re-embed the whole catalog and replace the index
    Build,
    /// Print the stored index header and alignment status
    Inspect,
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.shortlist/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = ShortlistConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for JSON output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Search { query, top_k, json } => {
            let top_k = top_k.unwrap_or(config.retrieval.default_top_k);
            cli::search::search(&config, &query, top_k, json).await?;
        }
        Command::Index { action } => match action {
            IndexAction::Build => {
                cli::build::build(&config).await?;
            }
            IndexAction::Inspect => {
                cli::inspect::inspect(&config)?;
            }
        },
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
