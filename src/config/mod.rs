//! Configuration loading and management
//!
//! Everything is optional: a missing config file runs the engine on the
//! built-in curriculum, the default score weights and a SQLite database
//! under `~/.questline/`.

mod io;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{ChapterDefinition, Curriculum, DEFAULT_LEVELS_PER_CHAPTER, LevelKind};
use crate::error::EngineError;
use crate::score::{ScoreProfile, ScoreProfiles};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Chapter layout; an empty list means the built-in curriculum
    #[serde(default, rename = "chapter")]
    pub chapters: Vec<ChapterEntry>,

    /// Per-level-type score weight overrides
    #[serde(default)]
    pub scoring: ScoringSettings,

    /// Achievement settings
    #[serde(default)]
    pub achievements: AchievementSettings,
}

/// Storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Progress database location; defaults to ~/.questline/progress.db
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// One `[[chapter]]` entry in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterEntry {
    /// 1-based chapter id; entries must be contiguous starting at 1
    pub id: u32,

    /// Display name
    pub name: String,

    /// Number of levels in the chapter
    #[serde(default = "default_chapter_levels")]
    pub total_levels: u32,
}

/// Per-level-type score weight overrides, keyed `[scoring.<type>]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub standard: ProfileOverride,

    #[serde(default)]
    pub quiz: ProfileOverride,

    #[serde(default)]
    pub puzzle: ProfileOverride,

    #[serde(default)]
    pub matching: ProfileOverride,
}

/// Partial score profile: unset fields keep the built-in value
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProfileOverride {
    #[serde(default)]
    pub accuracy_weight: Option<f64>,

    #[serde(default)]
    pub speed_weight: Option<f64>,

    #[serde(default)]
    pub hint_penalty_per_hint: Option<f64>,

    #[serde(default)]
    pub estimated_time_secs: Option<u32>,
}

/// Achievement settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementSettings {
    /// When false, completions never grant achievements
    #[serde(default = "default_achievements_enabled")]
    pub enabled: bool,
}

fn default_chapter_levels() -> u32 {
    DEFAULT_LEVELS_PER_CHAPTER
}

fn default_achievements_enabled() -> bool {
    true
}

impl Default for AchievementSettings {
    fn default() -> Self {
        Self {
            enabled: default_achievements_enabled(),
        }
    }
}

impl ScoringSettings {
    fn override_for(&self, kind: LevelKind) -> &ProfileOverride {
        match kind {
            LevelKind::Standard => &self.standard,
            LevelKind::Quiz => &self.quiz,
            LevelKind::Puzzle => &self.puzzle,
            LevelKind::Matching => &self.matching,
        }
    }
}

impl ProfileOverride {
    /// Lay this override over a base profile
    fn apply(&self, base: &ScoreProfile) -> ScoreProfile {
        ScoreProfile {
            accuracy_weight: self.accuracy_weight.unwrap_or(base.accuracy_weight),
            speed_weight: self.speed_weight.unwrap_or(base.speed_weight),
            hint_penalty_per_hint: self
                .hint_penalty_per_hint
                .unwrap_or(base.hint_penalty_per_hint),
            estimated_time_secs: self.estimated_time_secs.unwrap_or(base.estimated_time_secs),
        }
    }
}

impl Config {
    /// Build the curriculum this config describes.
    ///
    /// Chapter entries must be contiguous from id 1; an empty list falls
    /// back to the built-in four-chapter curriculum.
    pub fn curriculum(&self) -> Result<Curriculum, EngineError> {
        if self.chapters.is_empty() {
            return Ok(Curriculum::default());
        }
        let chapters = self
            .chapters
            .iter()
            .map(|entry| ChapterDefinition {
                id: entry.id,
                name: entry.name.clone(),
                total_levels: entry.total_levels,
            })
            .collect();
        Curriculum::new(chapters)
    }

    /// The built-in score profiles with this config's overrides applied
    pub fn score_profiles(&self) -> ScoreProfiles {
        let mut profiles = ScoreProfiles::default();
        for &kind in LevelKind::all() {
            let tweaked = self.scoring.override_for(kind).apply(profiles.profile(kind));
            profiles.set(kind, tweaked);
        }
        profiles
    }

    /// Resolved progress database path
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_builtin_defaults() {
        let config: Config = toml::from_str("").unwrap();

        let curriculum = config.curriculum().unwrap();
        assert_eq!(curriculum.chapters().len(), 4);
        assert_eq!(curriculum.total_level_count(), 20);

        // No overrides: every level type resolves to its built-in profile
        let profiles = config.score_profiles();
        let defaults = ScoreProfiles::default();
        for &kind in LevelKind::all() {
            assert_eq!(profiles.profile(kind), defaults.profile(kind));
        }
        assert_eq!(profiles.profile(LevelKind::Standard).estimated_time_secs, 180);
        assert!(config.achievements.enabled);
    }

    #[test]
    fn test_chapter_entries_build_the_curriculum() {
        let config: Config = toml::from_str(
            r#"
            [[chapter]]
            id = 1
            name = "Basics"
            total_levels = 3

            [[chapter]]
            id = 2
            name = "Advanced"
            "#,
        )
        .unwrap();

        let curriculum = config.curriculum().unwrap();
        assert_eq!(curriculum.chapters().len(), 2);
        assert_eq!(curriculum.total_levels(1), Some(3));
        // total_levels omitted falls back to the standard chapter size
        assert_eq!(curriculum.total_levels(2), Some(DEFAULT_LEVELS_PER_CHAPTER));
    }

    #[test]
    fn test_non_contiguous_chapters_are_rejected() {
        let config: Config = toml::from_str(
            r#"
            [[chapter]]
            id = 2
            name = "Starts too late"
            "#,
        )
        .unwrap();

        let err = config.curriculum().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_partial_scoring_override_keeps_other_fields() {
        let config: Config = toml::from_str(
            r#"
            [scoring.quiz]
            estimated_time_secs = 60

            [scoring.puzzle]
            hint_penalty_per_hint = 5.0
            "#,
        )
        .unwrap();

        let profiles = config.score_profiles();
        let quiz = profiles.profile(LevelKind::Quiz);
        assert_eq!(quiz.estimated_time_secs, 60);
        assert_eq!(quiz.accuracy_weight, 0.75);

        let puzzle = profiles.profile(LevelKind::Puzzle);
        assert_eq!(puzzle.hint_penalty_per_hint, 5.0);
        assert_eq!(puzzle.estimated_time_secs, 300);

        // Untouched kinds stay on the defaults
        assert_eq!(profiles.profile(LevelKind::Standard).speed_weight, 0.2);
    }

    #[test]
    fn test_db_path_override() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            db_path = "/tmp/questline-test/progress.db"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/questline-test/progress.db")
        );

        let default_config = Config::default();
        assert!(default_config.database_path().ends_with("progress.db"));
    }
}
