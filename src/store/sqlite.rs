//! SQLite-backed durable store
//!
//! Manages the `~/.questline/progress.db` database with automatic schema
//! migration. All timestamps are stored as epoch milliseconds; day buckets
//! are `YYYY-MM-DD` strings.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate};
use rusqlite::Connection;

use super::{CompletionUnit, ProgressStore, StoreError};
use crate::config::Config;
use crate::domain::{
    AchievementKind, AchievementRecord, LevelCoord, LevelState, ProgressRecord, StatisticsRecord,
};

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(cause, _) = &err {
            if matches!(
                cause.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return StoreError::Unavailable(err.to_string());
            }
        }
        StoreError::Failed(err.to_string())
    }
}

/// Database wrapper with a shared connection
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the default location
    /// (~/.questline/progress.db)
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = Config::global_config_dir().join("progress.db");
        Self::open(&db_path)
    }

    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Failed(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked while a completion commits
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Get a reference to the connection (for queries)
    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("progress DB lock poisoned")
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()?;
        Ok(())
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: add per-record play time (feeds the ranking average)
        if version < 2 {
            let has_time_spent: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('progress') WHERE name = 'time_spent_secs'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_time_spent {
                conn.execute_batch(
                    "ALTER TABLE progress ADD COLUMN time_spent_secs INTEGER NOT NULL DEFAULT 0;",
                )?;
            }

            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressRecord> {
        let state: String = row.get(3)?;
        let completion_ms: Option<i64> = row.get(7)?;
        let unlocked_ms: i64 = row.get(10)?;
        Ok(ProgressRecord {
            user_id: row.get(0)?,
            chapter: row.get(1)?,
            level: row.get(2)?,
            state: LevelState::from_str(&state).unwrap_or(LevelState::Locked),
            raw_score: row.get(4)?,
            final_score: row.get(5)?,
            hints_used: row.get(6)?,
            completion_time: completion_ms.and_then(DateTime::from_timestamp_millis),
            attempts: row.get(8)?,
            time_spent_secs: row.get::<_, i64>(9)? as u64,
            unlocked_at: DateTime::from_timestamp_millis(unlocked_ms)
                .unwrap_or(DateTime::UNIX_EPOCH),
        })
    }

    fn upsert_record(conn: &Connection, record: &ProgressRecord) -> Result<(), StoreError> {
        conn.execute(
            r#"INSERT OR REPLACE INTO progress
               (user_id, chapter, level, state, raw_score, final_score, hints_used,
                completion_time, attempts, time_spent_secs, unlocked_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            rusqlite::params![
                record.user_id,
                record.chapter,
                record.level,
                record.state.as_str(),
                record.raw_score,
                record.final_score,
                record.hints_used,
                record.completion_time.map(|t| t.timestamp_millis()),
                record.attempts,
                record.time_spent_secs as i64,
                record.unlocked_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn write_statistics(conn: &Connection, stats: &StatisticsRecord) -> Result<(), StoreError> {
        conn.execute(
            r#"INSERT OR REPLACE INTO statistics
               (user_id, total_levels_completed, total_score, average_score,
                current_streak, longest_streak, last_played)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            rusqlite::params![
                stats.user_id,
                stats.total_levels_completed,
                stats.total_score as i64,
                stats.average_score,
                stats.current_streak,
                stats.longest_streak,
                stats.last_played.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn insert_award(conn: &Connection, award: &AchievementRecord) -> Result<usize, StoreError> {
        let changed = conn.execute(
            r#"INSERT OR IGNORE INTO achievements (user_id, name, kind, earned_at)
               VALUES (?1, ?2, ?3, ?4)"#,
            rusqlite::params![
                award.user_id,
                award.name,
                award.kind.as_str(),
                award.earned_at.timestamp_millis(),
            ],
        )?;
        Ok(changed)
    }
}

const SELECT_RECORD: &str = r#"SELECT user_id, chapter, level, state, raw_score, final_score,
    hints_used, completion_time, attempts, time_spent_secs, unlocked_at FROM progress"#;

impl ProgressStore for SqliteStore {
    fn get(&self, user_id: &str, coord: LevelCoord) -> Result<Option<ProgressRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_RECORD} WHERE user_id = ?1 AND chapter = ?2 AND level = ?3"
        ))?;
        let record = stmt
            .query_row(
                rusqlite::params![user_id, coord.chapter, coord.level],
                Self::row_to_record,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(record)
    }

    fn records_for_user(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_RECORD} WHERE user_id = ?1 ORDER BY chapter, level"
        ))?;
        let records = stmt
            .query_map([user_id], Self::row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    fn all_records(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{SELECT_RECORD} ORDER BY user_id, chapter, level"))?;
        let records = stmt
            .query_map([], Self::row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    fn upsert(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let conn = self.conn();
        Self::upsert_record(&conn, record)
    }

    fn statistics(&self, user_id: &str) -> Result<Option<StatisticsRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"SELECT user_id, total_levels_completed, total_score, average_score,
               current_streak, longest_streak, last_played
               FROM statistics WHERE user_id = ?1"#,
        )?;
        let stats = stmt
            .query_row([user_id], |row| {
                let last_played: Option<String> = row.get(6)?;
                Ok(StatisticsRecord {
                    user_id: row.get(0)?,
                    total_levels_completed: row.get(1)?,
                    total_score: row.get::<_, i64>(2)? as u64,
                    average_score: row.get(3)?,
                    current_streak: row.get(4)?,
                    longest_streak: row.get(5)?,
                    last_played: last_played
                        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                })
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(stats)
    }

    fn put_statistics(&self, stats: &StatisticsRecord) -> Result<(), StoreError> {
        let conn = self.conn();
        Self::write_statistics(&conn, stats)
    }

    fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, name, kind, earned_at FROM achievements WHERE user_id = ?1 ORDER BY name",
        )?;
        let achievements = stmt
            .query_map([user_id], |row| {
                let kind: String = row.get(2)?;
                let earned_ms: i64 = row.get(3)?;
                Ok(AchievementRecord {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                    kind: AchievementKind::from_str(&kind).unwrap_or(AchievementKind::Milestone),
                    earned_at: DateTime::from_timestamp_millis(earned_ms)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(achievements)
    }

    fn achievement_counts(&self) -> Result<HashMap<String, u32>, StoreError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT user_id, COUNT(*) FROM achievements GROUP BY user_id")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(counts)
    }

    fn award(&self, achievement: &AchievementRecord) -> Result<bool, StoreError> {
        let conn = self.conn();
        Ok(Self::insert_award(&conn, achievement)? > 0)
    }

    fn commit_unit(&self, unit: &CompletionUnit) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        for record in &unit.records {
            Self::upsert_record(&tx, record)?;
        }
        Self::write_statistics(&tx, &unit.statistics)?;
        for award in &unit.awards {
            Self::insert_award(&tx, award)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM progress WHERE user_id = ?1", [user_id])?;
        tx.execute("DELETE FROM statistics WHERE user_id = ?1", [user_id])?;
        tx.execute("DELETE FROM achievements WHERE user_id = ?1", [user_id])?;
        tx.commit()?;
        Ok(())
    }
}

/// SQL schema for the progress database
const SCHEMA_SQL: &str = r#"
-- Per-user, per-level progress (one row per unlocked or completed level)
CREATE TABLE IF NOT EXISTS progress (
    user_id TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    level INTEGER NOT NULL,
    state TEXT NOT NULL,
    raw_score INTEGER NOT NULL DEFAULT 0,
    final_score INTEGER NOT NULL DEFAULT 0,
    hints_used INTEGER NOT NULL DEFAULT 0,
    completion_time INTEGER,
    attempts INTEGER NOT NULL DEFAULT 0,
    time_spent_secs INTEGER NOT NULL DEFAULT 0,
    unlocked_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, chapter, level)
);
CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id);

-- Per-user rollups, recomputed on every completion
CREATE TABLE IF NOT EXISTS statistics (
    user_id TEXT PRIMARY KEY,
    total_levels_completed INTEGER NOT NULL DEFAULT 0,
    total_score INTEGER NOT NULL DEFAULT 0,
    average_score REAL NOT NULL DEFAULT 0.0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_played TEXT
);

-- Earned achievements
CREATE TABLE IF NOT EXISTS achievements (
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    earned_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, name)
);
CREATE INDEX IF NOT EXISTS idx_achievements_user ON achievements(user_id);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (2);
"#;
