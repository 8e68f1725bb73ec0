//! Leaderboard command implementation

use anyhow::Result;
use std::path::Path;

/// Show the top of the leaderboard
pub async fn leaderboard_command(config_path: Option<&Path>, limit: usize, json: bool) -> Result<()> {
    let engine = super::build_engine(config_path)?;
    let entries = engine.leaderboard(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No completed levels yet.");
        return Ok(());
    }

    println!("Leaderboard (top {}):\n", entries.len());

    for entry in &entries {
        println!(
            "  #{:<3} {:<20} {:>6} pts  {:>5.1}% complete  {} achievement{}",
            entry.rank,
            entry.user_id,
            entry.total_score,
            entry.completion_rate,
            entry.achievement_count,
            if entry.achievement_count == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
