//! Persistence layer for progress, statistics and achievements
//!
//! Three implementations share one trait: the durable SQLite store, an
//! in-memory store for tests and ephemeral runs, and a fallback wrapper
//! that degrades to a local store when the durable one is unavailable.

mod fallback;
mod memory;
mod sqlite;

use std::collections::HashMap;

use crate::domain::{AchievementRecord, LevelCoord, ProgressRecord, StatisticsRecord};

pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Error type for store operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backend cannot be reached right now; retrying may succeed
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a hard failure
    #[error("storage operation failed: {0}")]
    Failed(String),
}

impl StoreError {
    /// Whether a retry has any chance of succeeding
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Where an answer came from, so callers can tell fresh data from
/// possibly-stale degraded-mode data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Served from the durable store
    Durable,
    /// Served from the local store while the durable one is unreachable
    Degraded,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Durable => "durable",
            Provenance::Degraded => "degraded",
        }
    }
}

/// Everything one completion writes, committed as a single unit.
///
/// Progress records, the recomputed statistics row and any new achievements
/// land together or not at all.
#[derive(Debug, Clone)]
pub struct CompletionUnit {
    pub records: Vec<ProgressRecord>,
    pub statistics: StatisticsRecord,
    pub awards: Vec<AchievementRecord>,
}

/// Storage backend for the progression engine.
///
/// Implementations use interior mutability so one store instance can be
/// shared behind an `Arc` by concurrent engine calls.
pub trait ProgressStore: Send + Sync {
    /// Fetch one user's record for one level, if any
    fn get(&self, user_id: &str, coord: LevelCoord) -> Result<Option<ProgressRecord>, StoreError>;

    /// All records for a user, ordered by (chapter, level)
    fn records_for_user(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Every record in the store, ordered by (user_id, chapter, level)
    fn all_records(&self) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Insert or fully replace a record keyed by (user_id, chapter, level)
    fn upsert(&self, record: &ProgressRecord) -> Result<(), StoreError>;

    /// Fetch a user's statistics rollup, if any
    fn statistics(&self, user_id: &str) -> Result<Option<StatisticsRecord>, StoreError>;

    /// Insert or fully replace a statistics rollup
    fn put_statistics(&self, stats: &StatisticsRecord) -> Result<(), StoreError>;

    /// A user's earned achievements, ordered by name
    fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, StoreError>;

    /// Achievement totals per user, for the ranking formula
    fn achievement_counts(&self) -> Result<HashMap<String, u32>, StoreError>;

    /// Award an achievement. Returns `false` if the user already had it.
    fn award(&self, achievement: &AchievementRecord) -> Result<bool, StoreError>;

    /// Commit a completion unit atomically
    fn commit_unit(&self, unit: &CompletionUnit) -> Result<(), StoreError>;

    /// Remove every trace of a user (admin reset)
    fn delete_user(&self, user_id: &str) -> Result<(), StoreError>;

    /// Provenance of answers served right now
    fn provenance(&self) -> Provenance {
        Provenance::Durable
    }
}
