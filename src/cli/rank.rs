//! Rank command implementation

use anyhow::Result;
use std::path::Path;

/// Show a user's global rank
pub async fn rank_command(config_path: Option<&Path>, user: &str) -> Result<()> {
    let engine = super::build_engine(config_path)?;

    match engine.user_rank(user)? {
        Some(rank) => println!("{} is ranked #{}", user, rank),
        None => println!("{} has no completed levels yet.", user),
    }

    Ok(())
}
