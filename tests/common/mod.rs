//! Shared test utilities for progression integration tests

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use questline::domain::{Curriculum, LevelKind, RawPerformance};
use questline::engine::ProgressionEngine;
use questline::store::SqliteStore;

/// Fixed wall clock so scores, streaks and day buckets are reproducible
pub fn fixed_now() -> DateTime<Utc> {
    "2026-05-01T12:00:00Z".parse().expect("valid timestamp")
}

/// Engine on a fresh SQLite database inside a temp directory.
///
/// Keep the returned TempDir alive for the duration of the test.
pub fn sqlite_engine() -> (ProgressionEngine<SqliteStore>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store =
        SqliteStore::open(&dir.path().join("progress.db")).expect("Failed to open progress DB");
    (ProgressionEngine::new(store, Curriculum::default()), dir)
}

/// Performance with an explicit elapsed time, ending at the fixed clock
pub fn timed_performance(raw: u32, hints: u32, elapsed_secs: i64) -> RawPerformance {
    let ended_at = fixed_now();
    RawPerformance::new(raw, hints, LevelKind::Standard)
        .with_times(ended_at - Duration::seconds(elapsed_secs), ended_at)
}
