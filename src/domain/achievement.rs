//! Earned achievement records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping of achievements, used for display and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    /// Total-completions milestones
    Milestone,
    /// Finishing every level of a chapter
    Chapter,
    /// Consecutive-day play streaks
    Streak,
    /// Performance feats such as a perfect score
    Skill,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::Milestone => "milestone",
            AchievementKind::Chapter => "chapter",
            AchievementKind::Streak => "streak",
            AchievementKind::Skill => "skill",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "milestone" => Some(AchievementKind::Milestone),
            "chapter" => Some(AchievementKind::Chapter),
            "streak" => Some(AchievementKind::Streak),
            "skill" => Some(AchievementKind::Skill),
            _ => None,
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One achievement earned by one user. The `(user_id, name)` pair is
/// unique; awarding the same name again is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub user_id: String,
    pub name: String,
    pub kind: AchievementKind,
    pub earned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            AchievementKind::Milestone,
            AchievementKind::Chapter,
            AchievementKind::Streak,
            AchievementKind::Skill,
        ] {
            assert_eq!(AchievementKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(AchievementKind::from_str("mystery"), None);
    }
}
