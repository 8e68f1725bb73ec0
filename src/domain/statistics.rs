//! Aggregated per-user statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Denormalized rollup of one user's progress records.
///
/// Recomputed from the progress records on every completion so the totals
/// can never drift from their source. The streak fields are the exception:
/// they carry day-to-day state that the records alone cannot reproduce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub user_id: String,
    pub total_levels_completed: u32,
    /// Sum of best final scores across completed levels
    pub total_score: u64,
    /// Mean best final score across completed levels, 0.0 when none
    pub average_score: f64,
    /// Consecutive play days ending today or yesterday
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Day bucket (UTC) of the most recent completion
    pub last_played: Option<NaiveDate>,
}

impl StatisticsRecord {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_levels_completed: 0,
            total_score: 0,
            average_score: 0.0,
            current_streak: 0,
            longest_streak: 0,
            last_played: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_statistics() {
        let stats = StatisticsRecord::empty("ana");
        assert_eq!(stats.user_id, "ana");
        assert_eq!(stats.total_levels_completed, 0);
        assert_eq!(stats.average_score, 0.0);
        assert!(stats.last_played.is_none());
    }
}
