use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "questline")]
#[command(about = "Questline - chapter/level progression and scoring for learning games")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.questline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ~/.questline/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Record a completed level for a user
    Complete {
        /// User the completion belongs to
        user: String,

        /// Chapter number (1-based)
        chapter: u32,

        /// Level number within the chapter (1-based)
        level: u32,

        /// Raw score earned in play (0-100)
        #[arg(short, long, default_value_t = 100)]
        score: u32,

        /// Hints used during the attempt
        #[arg(long, default_value_t = 0)]
        hints: u32,

        /// Seconds spent on the level (omit to skip the time bonus)
        #[arg(short, long)]
        time: Option<u32>,

        /// Level type: standard, quiz, puzzle or matching
        #[arg(short, long, default_value = "standard")]
        kind: String,
    },

    /// Show a user's chapter and level progress
    Progress {
        /// User to show
        user: String,

        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
    },

    /// Show the top of the leaderboard
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
    },

    /// Show a user's global rank
    Rank {
        /// User to look up
        user: String,
    },

    /// List a user's earned achievements
    Achievements {
        /// User to list
        user: String,
    },

    /// Delete all progress, statistics and achievements for a user
    Reset {
        /// User to reset
        user: String,

        /// Skip the confirmation check
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config;

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(config_path, force).await?;
        }
        Commands::Complete {
            user,
            chapter,
            level,
            score,
            hints,
            time,
            kind,
        } => {
            cli::complete::complete_command(
                config_path.as_deref(),
                &user,
                chapter,
                level,
                score,
                hints,
                time,
                &kind,
            )
            .await?;
        }
        Commands::Progress { user, json } => {
            cli::progress::progress_command(config_path.as_deref(), &user, json).await?;
        }
        Commands::Leaderboard { limit, json } => {
            cli::leaderboard::leaderboard_command(config_path.as_deref(), limit, json).await?;
        }
        Commands::Rank { user } => {
            cli::rank::rank_command(config_path.as_deref(), &user).await?;
        }
        Commands::Achievements { user } => {
            cli::achievements::achievements_command(config_path.as_deref(), &user).await?;
        }
        Commands::Reset { user, force } => {
            cli::reset::reset_command(config_path.as_deref(), &user, force).await?;
        }
    }

    Ok(())
}
