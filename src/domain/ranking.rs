//! Leaderboard entries

use serde::{Deserialize, Serialize};

/// One row of the computed leaderboard.
///
/// `ranking_score` blends total score, completion rate and achievement
/// count; ties on it are broken by faster average time, then by user id so
/// repeated runs over the same data produce the same ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1-based position after sorting
    pub rank: u32,
    pub user_id: String,
    /// Sum of best final scores
    pub total_score: u64,
    /// Completed levels as a percentage of the curriculum, 0..=100
    pub completion_rate: f64,
    pub achievement_count: u32,
    /// Mean minutes of play time per completed level
    pub avg_time_minutes: f64,
    /// Weighted composite the leaderboard sorts by
    pub ranking_score: f64,
}
