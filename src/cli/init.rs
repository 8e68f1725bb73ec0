//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

/// Default configuration content for questline init
pub const DEFAULT_CONFIG: &str = r#"# Questline Configuration
# =======================
#
# Chapter/level progression and scoring for learning games.
# Every section is optional: delete one and the engine falls back to its
# built-in defaults.

# ============================================================================
# STORAGE - Where progress is persisted
# ============================================================================
#
# Available options:
#   db_path - Progress database location (default: ~/.questline/progress.db)

[storage]
# db_path = "/var/lib/questline/progress.db"

# ============================================================================
# CHAPTERS - The ordered curriculum players move through
# ============================================================================
#
# Chapters unlock strictly in order: finishing every level of a chapter
# opens level 1 of the next one. Ids must be contiguous starting at 1.
#
# Available options:
#   id           - 1-based chapter number
#   name         - Display name (never interpreted by the engine)
#   total_levels - Levels in the chapter (default: 5)

[[chapter]]
id = 1
name = "Foundations"
total_levels = 5

[[chapter]]
id = 2
name = "Explorations"
total_levels = 5

[[chapter]]
id = 3
name = "Challenges"
total_levels = 5

[[chapter]]
id = 4
name = "Mastery"
total_levels = 5

# ============================================================================
# SCORING - Per-level-type score weights
# ============================================================================
#
# Final score = raw * accuracy_weight
#             + raw * speed_weight * time_multiplier
#             - hints * hint_penalty_per_hint
# clamped at zero and rounded. The time multiplier compares the time taken
# against estimated_time_secs and is clamped to 0.5..2.0.
#
# Level types: standard, quiz, puzzle, matching. Any field left out keeps
# its built-in value.

[scoring.standard]
# accuracy_weight = 0.7
# speed_weight = 0.2
# hint_penalty_per_hint = 10.0
# estimated_time_secs = 180

[scoring.quiz]
# accuracy_weight = 0.75
# speed_weight = 0.15
# hint_penalty_per_hint = 8.0
# estimated_time_secs = 120

[scoring.puzzle]
# accuracy_weight = 0.6
# speed_weight = 0.3
# hint_penalty_per_hint = 12.0
# estimated_time_secs = 300

[scoring.matching]
# accuracy_weight = 0.65
# speed_weight = 0.25
# hint_penalty_per_hint = 10.0
# estimated_time_secs = 150

# ============================================================================
# ACHIEVEMENTS
# ============================================================================
#
# Available options:
#   enabled - When false, completions never grant achievements (default: true)

[achievements]
enabled = true
"#;

/// Initialize a new Questline configuration
/// By default creates the global config at ~/.questline/config.toml
/// Use --config to specify a custom path
pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path =
        config_path.unwrap_or_else(questline::config::Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
