//! Per-user, per-level progress records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chapter::LevelCoord;
use super::level::LevelState;

/// One user's progress through one level.
///
/// A record is created in `Unlocked` state when the unlock rule fires and
/// moves to `Completed` on a completion event. It is never deleted except
/// by an explicit admin reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: String,
    pub chapter: u32,
    pub level: u32,
    pub state: LevelState,

    /// Raw performance score of the best completion, 0..=100
    pub raw_score: u32,
    /// Normalized score of the best completion (time/hint adjusted)
    pub final_score: u32,
    /// Hints used during the best completion
    pub hints_used: u32,

    /// When the level was last completed
    pub completion_time: Option<DateTime<Utc>>,
    /// Completion attempts, counting re-completions
    pub attempts: u32,
    /// Total play time across all attempts, in seconds (ranking input)
    pub time_spent_secs: u64,
    /// When the unlock rule created this record
    pub unlocked_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Create a fresh record in `Unlocked` state
    pub fn unlocked(user_id: &str, coord: LevelCoord, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            chapter: coord.chapter,
            level: coord.level,
            state: LevelState::Unlocked,
            raw_score: 0,
            final_score: 0,
            hints_used: 0,
            completion_time: None,
            attempts: 0,
            time_spent_secs: 0,
            unlocked_at: now,
        }
    }

    pub fn coord(&self) -> LevelCoord {
        LevelCoord::new(self.chapter, self.level)
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    /// Apply a completion event.
    ///
    /// Score policy is keep-best: `raw_score`, `final_score` and
    /// `hints_used` describe the best attempt and only change when the new
    /// final score beats the stored one. `attempts`, `time_spent_secs` and
    /// `completion_time` update on every completion, including replays of an
    /// already-completed level.
    pub fn record_completion(
        &mut self,
        raw_score: u32,
        final_score: u32,
        hints_used: u32,
        elapsed_secs: u64,
        now: DateTime<Utc>,
    ) {
        let first_completion = !self.is_completed();
        if first_completion || final_score > self.final_score {
            self.raw_score = raw_score;
            self.final_score = final_score;
            self.hints_used = hints_used;
        }
        self.state = LevelState::Completed;
        self.completion_time = Some(now);
        self.attempts += 1;
        self.time_spent_secs += elapsed_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-03-14T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_unlocked_record_starts_clean() {
        let record = ProgressRecord::unlocked("ana", LevelCoord::new(1, 2), now());
        assert_eq!(record.state, LevelState::Unlocked);
        assert_eq!(record.attempts, 0);
        assert_eq!(record.final_score, 0);
        assert!(record.completion_time.is_none());
    }

    #[test]
    fn test_first_completion_stores_scores() {
        let mut record = ProgressRecord::unlocked("ana", LevelCoord::new(1, 1), now());
        record.record_completion(80, 88, 1, 120, now());

        assert!(record.is_completed());
        assert_eq!(record.raw_score, 80);
        assert_eq!(record.final_score, 88);
        assert_eq!(record.hints_used, 1);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.time_spent_secs, 120);
        assert_eq!(record.completion_time, Some(now()));
    }

    #[test]
    fn test_recompletion_keeps_best_score() {
        let mut record = ProgressRecord::unlocked("ana", LevelCoord::new(1, 1), now());
        record.record_completion(90, 99, 0, 90, now());

        // Worse replay: score fields untouched, attempt/time still counted
        let later = now() + chrono::Duration::hours(1);
        record.record_completion(60, 61, 3, 200, later);

        assert_eq!(record.final_score, 99);
        assert_eq!(record.raw_score, 90);
        assert_eq!(record.hints_used, 0);
        assert_eq!(record.attempts, 2);
        assert_eq!(record.time_spent_secs, 290);
        assert_eq!(record.completion_time, Some(later));

        // Better replay overwrites the score trio together
        record.record_completion(95, 104, 1, 80, later);
        assert_eq!(record.final_score, 104);
        assert_eq!(record.raw_score, 95);
        assert_eq!(record.hints_used, 1);
        assert_eq!(record.attempts, 3);
    }
}
