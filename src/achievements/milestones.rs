//! Built-in achievement rules

use super::trigger::{AchievementGrant, AchievementTrigger, CompletionContext};
use crate::domain::AchievementKind;

/// Lifetime completion-count milestones
const COMPLETION_MILESTONES: [(u32, &str); 5] = [
    (1, "first_steps"),
    (5, "high_five"),
    (10, "ten_up"),
    (25, "quarter_century"),
    (50, "half_century"),
];

/// Consecutive-day streak milestones
const STREAK_MILESTONES: [(u32, &str); 3] = [
    (3, "streak_3"),
    (7, "streak_7"),
    (30, "streak_30"),
];

/// Completions within a single day
const MARATHON_THRESHOLD: u32 = 10;

/// The default rule set: completion milestones, per-chapter finishes,
/// streaks and skill feats.
pub struct MilestoneTrigger;

impl AchievementTrigger for MilestoneTrigger {
    fn evaluate(&self, ctx: &CompletionContext, earned: &[String]) -> Vec<AchievementGrant> {
        let mut grants = Vec::new();

        for (threshold, name) in COMPLETION_MILESTONES {
            if ctx.total_levels_completed >= threshold && !earned.contains(&name.to_string()) {
                grants.push(AchievementGrant::new(name, AchievementKind::Milestone));
            }
        }

        if let Some(chapter) = ctx.chapter_completed {
            let name = format!("chapter_{chapter}_complete");
            if !earned.contains(&name) {
                grants.push(AchievementGrant::new(name, AchievementKind::Chapter));
            }
        }

        for (threshold, name) in STREAK_MILESTONES {
            if ctx.current_streak >= threshold && !earned.contains(&name.to_string()) {
                grants.push(AchievementGrant::new(name, AchievementKind::Streak));
            }
        }

        // Flawless: a perfect raw run, before any time bonus
        if ctx.raw_score >= 100 && !earned.contains(&"flawless".to_string()) {
            grants.push(AchievementGrant::new("flawless", AchievementKind::Skill));
        }

        if ctx.levels_completed_today >= MARATHON_THRESHOLD
            && !earned.contains(&"marathon".to_string())
        {
            grants.push(AchievementGrant::new("marathon", AchievementKind::Skill));
        }

        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LevelCoord;

    fn ctx() -> CompletionContext {
        CompletionContext {
            coord: LevelCoord::first(),
            raw_score: 80,
            final_score: 85,
            elapsed_secs: 120,
            total_levels_completed: 1,
            chapter_completed: None,
            current_streak: 1,
            levels_completed_today: 1,
        }
    }

    fn names(grants: &[AchievementGrant]) -> Vec<&str> {
        grants.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn test_first_completion_grants_first_steps() {
        let grants = MilestoneTrigger.evaluate(&ctx(), &[]);
        assert_eq!(names(&grants), vec!["first_steps"]);
        assert_eq!(grants[0].kind, AchievementKind::Milestone);
    }

    #[test]
    fn test_earned_achievements_are_not_regranted() {
        let earned = vec!["first_steps".to_string()];
        let grants = MilestoneTrigger.evaluate(&ctx(), &earned);
        assert!(grants.is_empty());
    }

    #[test]
    fn test_crossing_several_thresholds_grants_each_once() {
        let mut context = ctx();
        context.total_levels_completed = 12;
        let earned = vec!["first_steps".to_string()];

        let grants = MilestoneTrigger.evaluate(&context, &earned);
        assert_eq!(names(&grants), vec!["high_five", "ten_up"]);
    }

    #[test]
    fn test_chapter_completion_is_named_after_the_chapter() {
        let mut context = ctx();
        context.chapter_completed = Some(2);

        let grants = MilestoneTrigger.evaluate(&context, &["first_steps".to_string()]);
        assert_eq!(names(&grants), vec!["chapter_2_complete"]);
        assert_eq!(grants[0].kind, AchievementKind::Chapter);
    }

    #[test]
    fn test_streak_and_flawless_grants() {
        let mut context = ctx();
        context.current_streak = 7;
        context.raw_score = 100;
        let earned = vec!["first_steps".to_string(), "streak_3".to_string()];

        let grants = MilestoneTrigger.evaluate(&context, &earned);
        assert_eq!(names(&grants), vec!["streak_7", "flawless"]);
    }

    #[test]
    fn test_marathon_needs_ten_in_a_day() {
        let mut context = ctx();
        context.levels_completed_today = 9;
        let earned = vec!["first_steps".to_string()];
        assert!(MilestoneTrigger.evaluate(&context, &earned).is_empty());

        context.levels_completed_today = 10;
        let grants = MilestoneTrigger.evaluate(&context, &earned);
        assert_eq!(names(&grants), vec!["marathon"]);
    }
}
