//! Achievements command implementation

use anyhow::Result;
use std::path::Path;

/// List a user's earned achievements
pub async fn achievements_command(config_path: Option<&Path>, user: &str) -> Result<()> {
    let engine = super::build_engine(config_path)?;
    let achievements = engine.achievements(user)?;

    if achievements.is_empty() {
        println!("{} has no achievements yet.", user);
        return Ok(());
    }

    println!("Achievements for {} ({}):\n", user, achievements.len());

    for achievement in &achievements {
        println!(
            "  {:<24} [{}] earned {}",
            achievement.name,
            achievement.kind,
            achievement.earned_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
