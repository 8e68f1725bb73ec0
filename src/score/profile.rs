//! Per-level-type score weight profiles

use serde::{Deserialize, Serialize};

use crate::domain::LevelKind;

/// Weights applied when normalizing raw performance into a final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreProfile {
    /// Share of the raw score carried into the base
    pub accuracy_weight: f64,
    /// Share of the raw score available as time bonus
    pub speed_weight: f64,
    /// Points subtracted per hint
    pub hint_penalty_per_hint: f64,
    /// Par time for the level type; faster earns a bonus multiplier
    pub estimated_time_secs: u32,
}

const STANDARD: ScoreProfile = ScoreProfile {
    accuracy_weight: 0.7,
    speed_weight: 0.2,
    hint_penalty_per_hint: 10.0,
    estimated_time_secs: 180,
};

const QUIZ: ScoreProfile = ScoreProfile {
    accuracy_weight: 0.75,
    speed_weight: 0.15,
    hint_penalty_per_hint: 8.0,
    estimated_time_secs: 120,
};

const PUZZLE: ScoreProfile = ScoreProfile {
    accuracy_weight: 0.6,
    speed_weight: 0.3,
    hint_penalty_per_hint: 12.0,
    estimated_time_secs: 300,
};

const MATCHING: ScoreProfile = ScoreProfile {
    accuracy_weight: 0.65,
    speed_weight: 0.25,
    hint_penalty_per_hint: 10.0,
    estimated_time_secs: 150,
};

/// The full profile table, one entry per level type.
///
/// Unrecognized level types already collapsed to [`LevelKind::Standard`]
/// during parsing, so every lookup here hits a real profile.
#[derive(Debug, Clone)]
pub struct ScoreProfiles {
    standard: ScoreProfile,
    quiz: ScoreProfile,
    puzzle: ScoreProfile,
    matching: ScoreProfile,
}

impl Default for ScoreProfiles {
    fn default() -> Self {
        Self {
            standard: STANDARD,
            quiz: QUIZ,
            puzzle: PUZZLE,
            matching: MATCHING,
        }
    }
}

impl ScoreProfiles {
    pub fn profile(&self, kind: LevelKind) -> &ScoreProfile {
        match kind {
            LevelKind::Standard => &self.standard,
            LevelKind::Quiz => &self.quiz,
            LevelKind::Puzzle => &self.puzzle,
            LevelKind::Matching => &self.matching,
        }
    }

    /// Replace the profile for one level type (config override)
    pub fn set(&mut self, kind: LevelKind, profile: ScoreProfile) {
        match kind {
            LevelKind::Standard => self.standard = profile,
            LevelKind::Quiz => self.quiz = profile,
            LevelKind::Puzzle => self.puzzle = profile,
            LevelKind::Matching => self.matching = profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_profile() {
        let profiles = ScoreProfiles::default();
        for &kind in LevelKind::all() {
            let profile = profiles.profile(kind);
            assert!(profile.accuracy_weight > 0.0);
            assert!(profile.estimated_time_secs > 0);
        }
    }

    #[test]
    fn test_set_overrides_one_kind() {
        let mut profiles = ScoreProfiles::default();
        let tweaked = ScoreProfile {
            estimated_time_secs: 60,
            ..*profiles.profile(LevelKind::Quiz)
        };
        profiles.set(LevelKind::Quiz, tweaked);

        assert_eq!(profiles.profile(LevelKind::Quiz).estimated_time_secs, 60);
        assert_eq!(profiles.profile(LevelKind::Standard).estimated_time_secs, 180);
    }
}
