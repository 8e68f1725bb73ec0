//! Trigger seam between the engine and achievement rules

use crate::domain::{AchievementKind, LevelCoord};

/// What the engine knows at the moment a completion lands.
///
/// The trigger decides achievement identity from this context alone; the
/// engine never hardcodes achievement names.
#[derive(Debug, Clone)]
pub struct CompletionContext {
    pub coord: LevelCoord,
    pub raw_score: u32,
    pub final_score: u32,
    pub elapsed_secs: u64,
    /// Lifetime completed-level count after this completion
    pub total_levels_completed: u32,
    /// Chapter id that became fully completed in this event, if any
    pub chapter_completed: Option<u32>,
    pub current_streak: u32,
    /// Levels completed so far today, this one included
    pub levels_completed_today: u32,
}

/// An achievement a trigger decided to grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementGrant {
    pub name: String,
    pub kind: AchievementKind,
}

impl AchievementGrant {
    pub fn new(name: impl Into<String>, kind: AchievementKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Decides which achievements a completion earns.
///
/// `earned` lists the names the user already holds, so implementations
/// only return genuinely new grants. Awarding is idempotent downstream
/// regardless, but triggers should not rely on that.
pub trait AchievementTrigger: Send + Sync {
    fn evaluate(&self, ctx: &CompletionContext, earned: &[String]) -> Vec<AchievementGrant>;
}

/// Trigger that grants nothing (achievements disabled)
pub struct NoAchievements;

impl AchievementTrigger for NoAchievements {
    fn evaluate(&self, _ctx: &CompletionContext, _earned: &[String]) -> Vec<AchievementGrant> {
        Vec::new()
    }
}
