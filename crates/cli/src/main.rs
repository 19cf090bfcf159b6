//! RepoLens CLI — the main entry point.
//!
//! Commands:
//! - `init`      — Write a default config file
//! - `summarize` — Summarize a repository URL or local directory
//! - `serve`     — Start the HTTP gateway

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "repolens",
    about = "RepoLens — AI repository summarizer",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Summarize a GitHub repository (or a local directory)
    Summarize {
        /// Repository URL (https://github.com/owner/repo) or local path
        target: String,

        /// Restrict candidates by tier: all, high, high+medium
        #[arg(short, long, default_value = "all")]
        priority: String,

        /// Print the full metadata alongside the summary
        #[arg(short, long)]
        metadata: bool,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Summarize {
            target,
            priority,
            metadata,
        } => commands::summarize::run(&target, &priority, metadata).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}
