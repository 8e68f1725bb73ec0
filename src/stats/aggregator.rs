//! Recomputes per-user statistics from source records

use chrono::NaiveDate;

use super::streak::advance_streak;
use crate::domain::{ProgressRecord, StatisticsRecord};

/// Rebuild a user's statistics after a completion on `today`.
///
/// Totals and the average are recomputed by scanning the completed records,
/// never by bumping stored counters, so the rollup cannot drift from its
/// source. Streak state carries over from the previous rollup and advances
/// by the calendar-day rule.
pub fn recompute_statistics<'a, I>(
    user_id: &str,
    records: I,
    previous: Option<&StatisticsRecord>,
    today: NaiveDate,
) -> StatisticsRecord
where
    I: IntoIterator<Item = &'a ProgressRecord>,
{
    let mut completed = 0u32;
    let mut total_score = 0u64;
    for record in records {
        if record.is_completed() {
            completed += 1;
            total_score += record.final_score as u64;
        }
    }
    let average_score = if completed > 0 {
        total_score as f64 / completed as f64
    } else {
        0.0
    };

    let (current, longest, last_played) = previous
        .map(|p| (p.current_streak, p.longest_streak, p.last_played))
        .unwrap_or((0, 0, None));
    let streak = advance_streak(today, last_played, current, longest);

    StatisticsRecord {
        user_id: user_id.to_string(),
        total_levels_completed: completed,
        total_score,
        average_score,
        current_streak: streak.current,
        longest_streak: streak.longest,
        last_played: Some(today),
    }
}
