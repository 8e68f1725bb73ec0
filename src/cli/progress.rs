//! Progress command implementation

use anyhow::Result;
use std::path::Path;

use questline::domain::LevelState;
use questline::store::Provenance;

/// Show a user's chapter and level progress
pub async fn progress_command(config_path: Option<&Path>, user: &str, json: bool) -> Result<()> {
    let engine = super::build_engine(config_path)?;
    let snapshot = engine.progress_snapshot(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Progress for {}:\n", snapshot.user_id);

    for chapter in &snapshot.chapters {
        println!(
            "  Chapter {}: {} ({}/{})",
            chapter.chapter, chapter.name, chapter.completed_levels, chapter.total_levels
        );

        for level in &chapter.levels {
            match level.state {
                LevelState::Completed => println!(
                    "    Level {} [{}] score {} ({} attempt{})",
                    level.level,
                    level.state,
                    level.final_score,
                    level.attempts,
                    if level.attempts == 1 { "" } else { "s" }
                ),
                _ => println!("    Level {} [{}]", level.level, level.state),
            }
        }
        println!();
    }

    let stats = &snapshot.statistics;
    println!("  Levels completed: {}", stats.total_levels_completed);
    println!("  Total score:      {}", stats.total_score);
    println!("  Average score:    {:.1}", stats.average_score);
    println!(
        "  Streak:           {} day(s), longest {}",
        stats.current_streak, stats.longest_streak
    );
    if let Some(day) = stats.last_played {
        println!("  Last played:      {}", day);
    }

    if snapshot.provenance == Provenance::Degraded {
        println!("\n  (local data; the durable store is unreachable)");
    }

    Ok(())
}
