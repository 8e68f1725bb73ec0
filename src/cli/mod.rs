//! CLI command implementations

pub mod achievements;
pub mod complete;
pub mod init;
pub mod leaderboard;
pub mod progress;
pub mod rank;
pub mod reset;

use std::path::Path;

use anyhow::{Context, Result};

use questline::achievements::{AchievementTrigger, MilestoneTrigger, NoAchievements};
use questline::config::Config;
use questline::engine::ProgressionEngine;
use questline::store::SqliteStore;

/// Load the configuration, explicit path first, global config otherwise
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

/// Open the progression engine on the durable store described by the config
pub fn build_engine(config_path: Option<&Path>) -> Result<ProgressionEngine<SqliteStore>> {
    let config = load_config(config_path)?;
    let curriculum = config
        .curriculum()
        .context("Invalid chapter layout in config")?;
    let store = SqliteStore::open(&config.database_path())
        .context("Failed to open progress database")?;

    let trigger: Box<dyn AchievementTrigger> = if config.achievements.enabled {
        Box::new(MilestoneTrigger)
    } else {
        Box::new(NoAchievements)
    };

    Ok(ProgressionEngine::with_parts(
        store,
        curriculum,
        config.score_profiles(),
        trigger,
    ))
}
