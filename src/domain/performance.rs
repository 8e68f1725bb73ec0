//! Raw performance input for a completion event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::LevelKind;

/// What the play session reports when a learner finishes a level.
///
/// This is the untrusted input to the score engine: the raw score is
/// clamped and the timestamps are validated before any math runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPerformance {
    /// Unadjusted performance score, 0..=100
    pub raw_score: u32,
    pub hints_used: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: LevelKind,
}

impl RawPerformance {
    pub fn new(raw_score: u32, hints_used: u32, kind: LevelKind) -> Self {
        Self {
            raw_score,
            hints_used,
            started_at: None,
            ended_at: None,
            kind,
        }
    }

    pub fn with_times(mut self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self.ended_at = Some(ended_at);
        self
    }

    /// Elapsed play time in whole seconds, if both timestamps are present
    /// and in order. Missing or inverted timestamps yield `None` and the
    /// score engine skips the time bonus.
    pub fn elapsed_secs(&self) -> Option<i64> {
        let (start, end) = (self.started_at?, self.ended_at?);
        let secs = (end - start).num_seconds();
        if secs > 0 { Some(secs) } else { None }
    }
}
