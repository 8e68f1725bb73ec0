//! Leaderboard ranking engine
//!
//! Derives a weighted ranking score per user from persisted progress
//! records and achievement counts, then produces a fully deterministic
//! ordering. Nothing here is incremental: every call recomputes from
//! source data.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::domain::{Curriculum, ProgressRecord, RankingEntry};

const TOTAL_SCORE_WEIGHT: f64 = 0.6;
const COMPLETION_RATE_WEIGHT: f64 = 0.3;
const ACHIEVEMENT_WEIGHT: f64 = 0.1;
const POINTS_PER_ACHIEVEMENT: f64 = 100.0;

#[derive(Default)]
struct UserAggregate {
    completed: u32,
    total_score: u64,
    time_spent_secs: u64,
}

/// Compute the full leaderboard over every user with at least one
/// completed level.
///
/// Sorted descending by ranking score; ties break ascending by average
/// minutes per level (faster wins), then by user id so the ordering never
/// depends on iteration order. Ranks are assigned 1-based after sorting.
pub fn compute_rankings(
    records: &[ProgressRecord],
    achievement_counts: &HashMap<String, u32>,
    curriculum: &Curriculum,
) -> Vec<RankingEntry> {
    let total_levels = curriculum.total_level_count().max(1) as f64;

    // BTreeMap keyed by user id keeps aggregation order stable
    let mut aggregates: BTreeMap<&str, UserAggregate> = BTreeMap::new();
    for record in records {
        if !record.is_completed() {
            continue;
        }
        let aggregate = aggregates.entry(record.user_id.as_str()).or_default();
        aggregate.completed += 1;
        aggregate.total_score += record.final_score as u64;
        aggregate.time_spent_secs += record.time_spent_secs;
    }

    let mut entries: Vec<RankingEntry> = aggregates
        .into_iter()
        .filter(|(_, agg)| agg.completed > 0)
        .map(|(user_id, agg)| {
            let completion_rate = (agg.completed as f64 / total_levels) * 100.0;
            let achievement_count = achievement_counts.get(user_id).copied().unwrap_or(0);
            let avg_time_minutes = agg.time_spent_secs as f64 / 60.0 / agg.completed as f64;
            let ranking_score = agg.total_score as f64 * TOTAL_SCORE_WEIGHT
                + completion_rate * COMPLETION_RATE_WEIGHT
                + achievement_count as f64 * POINTS_PER_ACHIEVEMENT * ACHIEVEMENT_WEIGHT;
            RankingEntry {
                rank: 0,
                user_id: user_id.to_string(),
                total_score: agg.total_score,
                completion_rate,
                achievement_count,
                avg_time_minutes,
                ranking_score,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.ranking_score
            .total_cmp(&a.ranking_score) // Higher score first
            .then(a.avg_time_minutes.total_cmp(&b.avg_time_minutes)) // Faster average wins ties
            .then(a.user_id.cmp(&b.user_id)) // User id for stable ordering
    });

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    entries
}

/// The top `limit` entries of the leaderboard
pub fn top_students(
    records: &[ProgressRecord],
    achievement_counts: &HashMap<String, u32>,
    curriculum: &Curriculum,
    limit: usize,
) -> Vec<RankingEntry> {
    let mut entries = compute_rankings(records, achievement_counts, curriculum);
    entries.truncate(limit);
    entries
}

/// A user's 1-based position in the global ordering, or `None` while they
/// have no completed levels
pub fn user_rank(
    records: &[ProgressRecord],
    achievement_counts: &HashMap<String, u32>,
    curriculum: &Curriculum,
    user_id: &str,
) -> Option<u32> {
    compute_rankings(records, achievement_counts, curriculum)
        .iter()
        .find(|entry| entry.user_id == user_id)
        .map(|entry| entry.rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LevelCoord;
    use chrono::Utc;

    fn completed(user: &str, level: u32, final_score: u32, secs: u64) -> ProgressRecord {
        let mut r = ProgressRecord::unlocked(user, LevelCoord::new(1, level), Utc::now());
        r.record_completion(final_score, final_score, 0, secs, Utc::now());
        r
    }

    fn no_achievements() -> HashMap<String, u32> {
        HashMap::new()
    }

    #[test]
    fn test_higher_ranking_score_wins() {
        let records = vec![
            completed("slow_and_low", 1, 50, 300),
            completed("sharp", 1, 95, 300),
        ];
        let entries = compute_rankings(&records, &no_achievements(), &Curriculum::default());

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_id, "sharp");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].user_id, "slow_and_low");
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn test_achievements_feed_the_score() {
        let records = vec![completed("ana", 1, 80, 300), completed("bob", 1, 80, 300)];
        let mut counts = HashMap::new();
        counts.insert("bob".to_string(), 2);

        let entries = compute_rankings(&records, &counts, &Curriculum::default());
        assert_eq!(entries[0].user_id, "bob");
        assert_eq!(entries[0].achievement_count, 2);
        // 2 achievements * 100 * 0.1
        assert_eq!(entries[0].ranking_score - entries[1].ranking_score, 20.0);
    }

    #[test]
    fn test_ties_break_on_faster_average_time() {
        // Identical scores and completion, different pace
        let records = vec![
            completed("tortoise", 1, 90, 600),
            completed("hare", 1, 90, 120),
        ];
        let entries = compute_rankings(&records, &no_achievements(), &Curriculum::default());

        assert_eq!(entries[0].user_id, "hare");
        assert_eq!(entries[1].user_id, "tortoise");
    }

    #[test]
    fn test_full_tie_orders_by_user_id() {
        let records = vec![
            completed("zoe", 1, 90, 120),
            completed("ana", 1, 90, 120),
        ];
        let entries = compute_rankings(&records, &no_achievements(), &Curriculum::default());
        assert_eq!(entries[0].user_id, "ana");
        assert_eq!(entries[1].user_id, "zoe");
    }

    #[test]
    fn test_zero_completions_never_rank() {
        let records = vec![
            completed("ana", 1, 90, 120),
            ProgressRecord::unlocked("ghost", LevelCoord::new(1, 1), Utc::now()),
        ];
        let entries = compute_rankings(&records, &no_achievements(), &Curriculum::default());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "ana");
        assert_eq!(
            user_rank(&records, &no_achievements(), &Curriculum::default(), "ghost"),
            None
        );
        assert_eq!(
            user_rank(&records, &no_achievements(), &Curriculum::default(), "ana"),
            Some(1)
        );
    }

    #[test]
    fn test_top_students_truncates_after_ranking() {
        let records: Vec<ProgressRecord> = (0..5)
            .map(|i| completed(&format!("user{i}"), 1, 50 + i * 10, 120))
            .collect();
        let top = top_students(&records, &no_achievements(), &Curriculum::default(), 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, "user4");
        assert_eq!(top[1].user_id, "user3");
        assert_eq!(top[1].rank, 2);
    }

    #[test]
    fn test_completion_rate_is_a_percentage_of_the_curriculum() {
        let records = vec![
            completed("ana", 1, 100, 60),
            completed("ana", 2, 100, 60),
        ];
        // Default curriculum has 20 levels
        let entries = compute_rankings(&records, &no_achievements(), &Curriculum::default());
        assert_eq!(entries[0].completion_rate, 10.0);
        assert_eq!(entries[0].avg_time_minutes, 1.0);
    }
}
