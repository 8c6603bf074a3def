//! Marketeer CLI: the main entry point.
//!
//! Commands:
//! - `platforms`: List the platform rule table
//! - `validate`: Audit existing copy against a platform
//! - `chat`: Single-shot or interactive copywriting turns
//! - `video`: Plan or script a short-form video

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "marketeer",
    about = "Marketeer — platform-aware marketing copy with guardrails",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.marketeer/config.toml)
    #[arg(short, long, global = true, env = "MARKETEER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported platforms and their limits
    Platforms,

    /// Validate and edit text against a platform's rules
    Validate {
        /// Target platform (id or alias)
        #[arg(short, long)]
        platform: String,

        /// Read text from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write or refine a post with the configured model
    Chat {
        #[command(flatten)]
        campaign: commands::chat::CampaignArgs,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print the turn outcome as JSON (single message mode)
        #[arg(long)]
        json: bool,
    },

    /// Plan or script a short-form video
    Video {
        #[command(flatten)]
        video: commands::video::VideoArgs,

        /// Only print the timed beat plan, without calling the model
        #[arg(long)]
        plan_only: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
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
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Platforms => commands::platforms::run(config_path).await?,
        Commands::Validate {
            platform,
            file,
            json,
        } => commands::validate::run(config_path, &platform, file.as_deref(), json).await?,
        Commands::Chat {
            campaign,
            message,
            json,
        } => commands::chat::run(config_path, campaign, message, json).await?,
        Commands::Video {
            video,
            plan_only,
            json,
        } => commands::video::run(config_path, video, plan_only, json).await?,
    }

    Ok(())
}
