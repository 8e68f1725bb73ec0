//! The progression engine
//!
//! Coordinates the score engine, the unlock state machine, the statistics
//! aggregator and the achievement trigger over one store. Every completion
//! runs as a single unit of work: score, mark completed, evaluate unlocks,
//! recompute statistics, evaluate achievements, then commit everything in
//! one store transaction. Transient storage failures retry the whole unit.

mod locks;

pub use locks::UserLocks;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::achievements::{AchievementTrigger, CompletionContext, MilestoneTrigger};
use crate::domain::{
    AchievementRecord, ChapterDefinition, Curriculum, LevelCoord, LevelState, RankingEntry,
    RawPerformance, StatisticsRecord,
};
use crate::error::EngineError;
use crate::progression::{AccessCheck, ProgressionMachine, UserProgress};
use crate::ranking;
use crate::score::{ScoreProfiles, compute_final_score};
use crate::stats::recompute_statistics;
use crate::store::{CompletionUnit, ProgressStore, Provenance};

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// What one completion produced
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub final_score: u32,
    /// Levels newly unlocked by this completion
    pub unlocked: Vec<LevelCoord>,
    pub chapter_completed: bool,
    pub content_exhausted: bool,
    /// Achievement names granted by this completion
    pub newly_awarded: Vec<String>,
    /// Whether the result landed in the durable store or a degraded local one
    pub provenance: Provenance,
}

/// One level inside a progress snapshot
#[derive(Debug, Clone, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    pub state: LevelState,
    pub final_score: u32,
    pub attempts: u32,
}

/// One chapter inside a progress snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ChapterProgress {
    pub chapter: u32,
    pub name: String,
    pub total_levels: u32,
    pub completed_levels: u32,
    pub levels: Vec<LevelProgress>,
}

/// Full per-chapter view of one user's progress
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub chapters: Vec<ChapterProgress>,
    pub statistics: StatisticsRecord,
    pub provenance: Provenance,
}

/// The engine facade the caller-facing layer talks to.
///
/// Holds the store behind a trait so tests run against the in-memory store
/// and production against SQLite (optionally wrapped in the fallback).
pub struct ProgressionEngine<S> {
    store: S,
    machine: ProgressionMachine,
    profiles: ScoreProfiles,
    trigger: Box<dyn AchievementTrigger>,
    locks: UserLocks,
}

impl<S: ProgressStore> ProgressionEngine<S> {
    /// Engine with default score profiles and the built-in milestone rules
    pub fn new(store: S, curriculum: Curriculum) -> Self {
        Self::with_parts(store, curriculum, ScoreProfiles::default(), Box::new(MilestoneTrigger))
    }

    pub fn with_parts(
        store: S,
        curriculum: Curriculum,
        profiles: ScoreProfiles,
        trigger: Box<dyn AchievementTrigger>,
    ) -> Self {
        Self {
            store,
            machine: ProgressionMachine::new(curriculum),
            profiles,
            trigger,
            locks: UserLocks::new(),
        }
    }

    pub fn curriculum(&self) -> &Curriculum {
        self.machine.curriculum()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one completion event end to end.
    ///
    /// Computes the final score, records the completion, evaluates unlock
    /// and achievement rules, recomputes statistics and commits the whole
    /// unit atomically. Serialized per user; concurrent completions for the
    /// same user apply one after the other and both count.
    pub fn complete_level(
        &self,
        user_id: &str,
        coord: LevelCoord,
        performance: &RawPerformance,
    ) -> Result<CompletionOutcome, EngineError> {
        self.complete_level_at(user_id, coord, performance, Utc::now())
    }

    /// [`ProgressionEngine::complete_level`] with an explicit clock, for
    /// tests and replay tooling
    pub fn complete_level_at(
        &self,
        user_id: &str,
        coord: LevelCoord,
        performance: &RawPerformance,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, EngineError> {
        // Unknown coordinates are fatal before any lock or store call
        self.machine.curriculum().require(coord)?;

        let profile = self.profiles.profile(performance.kind);
        let final_score = compute_final_score(performance, profile);
        let raw_score = performance.raw_score.min(100);
        let elapsed_secs = performance.elapsed_secs().unwrap_or(0) as u64;

        let slot = self.locks.slot(user_id);
        let _guard = slot.lock().expect("user lock poisoned");

        self.with_retry("complete level", || {
            self.apply_completion(user_id, coord, raw_score, final_score, performance, elapsed_secs, now)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_completion(
        &self,
        user_id: &str,
        coord: LevelCoord,
        raw_score: u32,
        final_score: u32,
        performance: &RawPerformance,
        elapsed_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, EngineError> {
        let mut progress = UserProgress::from_records(self.store.records_for_user(user_id)?);

        self.machine.mark_level_completed(
            &mut progress,
            user_id,
            coord,
            raw_score,
            final_score,
            performance.hints_used,
            elapsed_secs,
            now,
        )?;
        let unlock = self.machine.unlock_next(&mut progress, user_id, coord, now)?;

        let today = now.date_naive();
        let previous = self.store.statistics(user_id)?;
        let statistics =
            recompute_statistics(user_id, progress.records(), previous.as_ref(), today);

        let completed_today = progress
            .records()
            .filter(|r| {
                r.is_completed()
                    && r.completion_time.map(|t| t.date_naive() == today).unwrap_or(false)
            })
            .count() as u32;

        let earned: Vec<String> = self
            .store
            .achievements(user_id)?
            .into_iter()
            .map(|a| a.name)
            .collect();
        let context = CompletionContext {
            coord,
            raw_score,
            final_score,
            elapsed_secs,
            total_levels_completed: statistics.total_levels_completed,
            chapter_completed: unlock.chapter_completed.then_some(coord.chapter),
            current_streak: statistics.current_streak,
            levels_completed_today: completed_today,
        };
        let grants = self.trigger.evaluate(&context, &earned);
        let newly_awarded: Vec<String> = grants.iter().map(|g| g.name.clone()).collect();
        let awards: Vec<AchievementRecord> = grants
            .into_iter()
            .map(|grant| AchievementRecord {
                user_id: user_id.to_string(),
                name: grant.name,
                kind: grant.kind,
                earned_at: now,
            })
            .collect();

        let unit = CompletionUnit {
            records: progress.take_dirty(),
            statistics,
            awards,
        };
        self.store.commit_unit(&unit)?;

        Ok(CompletionOutcome {
            final_score,
            unlocked: unlock.unlocked,
            chapter_completed: unlock.chapter_completed,
            content_exhausted: unlock.content_exhausted,
            newly_awarded,
            provenance: self.store.provenance(),
        })
    }

    /// Whether `user_id` may enter `coord` right now
    pub fn validate_access(
        &self,
        user_id: &str,
        coord: LevelCoord,
    ) -> Result<AccessCheck, EngineError> {
        let records =
            self.with_retry("load progress", || Ok(self.store.records_for_user(user_id)?))?;
        let progress = UserProgress::from_records(records);
        self.machine.validate_access(&progress, coord)
    }

    /// Per-chapter unlock/completion map plus the statistics rollup
    pub fn progress_snapshot(&self, user_id: &str) -> Result<ProgressSnapshot, EngineError> {
        let records =
            self.with_retry("load progress", || Ok(self.store.records_for_user(user_id)?))?;
        let progress = UserProgress::from_records(records);
        let statistics = self
            .with_retry("load statistics", || Ok(self.store.statistics(user_id)?))?
            .unwrap_or_else(|| StatisticsRecord::empty(user_id));

        let chapters = self
            .machine
            .curriculum()
            .chapters()
            .iter()
            .map(|chapter| self.chapter_progress(chapter, &progress))
            .collect();

        Ok(ProgressSnapshot {
            user_id: user_id.to_string(),
            chapters,
            statistics,
            provenance: self.store.provenance(),
        })
    }

    fn chapter_progress(
        &self,
        chapter: &ChapterDefinition,
        progress: &UserProgress,
    ) -> ChapterProgress {
        let levels: Vec<LevelProgress> = (1..=chapter.total_levels)
            .map(|level| {
                let coord = LevelCoord::new(chapter.id, level);
                match progress.get(coord) {
                    Some(record) => LevelProgress {
                        level,
                        state: record.state,
                        final_score: record.final_score,
                        attempts: record.attempts,
                    },
                    // The entry level is open for everyone even before any
                    // record exists
                    None => LevelProgress {
                        level,
                        state: if coord.is_first() {
                            LevelState::Unlocked
                        } else {
                            LevelState::Locked
                        },
                        final_score: 0,
                        attempts: 0,
                    },
                }
            })
            .collect();

        ChapterProgress {
            chapter: chapter.id,
            name: chapter.name.clone(),
            total_levels: chapter.total_levels,
            completed_levels: levels.iter().filter(|l| l.state.is_completed()).count() as u32,
            levels,
        }
    }

    /// Top `limit` of the leaderboard, recomputed from persisted records
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<RankingEntry>, EngineError> {
        let records = self.with_retry("load records", || Ok(self.store.all_records()?))?;
        let counts =
            self.with_retry("load achievements", || Ok(self.store.achievement_counts()?))?;
        Ok(ranking::top_students(&records, &counts, self.machine.curriculum(), limit))
    }

    /// 1-based global rank, or `None` with no completed levels yet
    pub fn user_rank(&self, user_id: &str) -> Result<Option<u32>, EngineError> {
        let records = self.with_retry("load records", || Ok(self.store.all_records()?))?;
        let counts =
            self.with_retry("load achievements", || Ok(self.store.achievement_counts()?))?;
        Ok(ranking::user_rank(&records, &counts, self.machine.curriculum(), user_id))
    }

    /// A user's earned achievements
    pub fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, EngineError> {
        self.with_retry("load achievements", || Ok(self.store.achievements(user_id)?))
    }

    /// Admin reset: drop every record, rollup and achievement for a user
    pub fn reset_user(&self, user_id: &str) -> Result<(), EngineError> {
        let slot = self.locks.slot(user_id);
        let _guard = slot.lock().expect("user lock poisoned");
        self.with_retry("reset user", || Ok(self.store.delete_user(user_id)?))
    }

    /// Run `op`, retrying transient storage failures with exponential
    /// backoff. Anything else surfaces on the first hit.
    fn with_retry<T>(
        &self,
        action: &str,
        mut op: impl FnMut() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut attempt = 0u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(EngineError::Storage(err))
                    if err.is_transient() && attempt + 1 < RETRY_ATTEMPTS =>
                {
                    attempt += 1;
                    let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
                    tracing::warn!(
                        "{} hit transient storage failure (attempt {}/{}), retrying in {}ms: {}",
                        action,
                        attempt,
                        RETRY_ATTEMPTS,
                        delay,
                        err
                    );
                    std::thread::sleep(Duration::from_millis(delay));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreconditionError;
    use crate::store::MemoryStore;
    use chrono::Duration as ChronoDuration;

    fn engine() -> ProgressionEngine<MemoryStore> {
        ProgressionEngine::new(MemoryStore::new(), Curriculum::default())
    }

    fn now() -> DateTime<Utc> {
        "2026-03-14T09:00:00Z".parse().unwrap()
    }

    fn performance(raw: u32, hints: u32, elapsed_secs: i64) -> RawPerformance {
        let start = now() - ChronoDuration::seconds(elapsed_secs);
        RawPerformance::new(raw, hints, crate::domain::LevelKind::Standard)
            .with_times(start, now())
    }

    #[test]
    fn test_completion_scores_unlocks_and_awards() {
        let engine = engine();
        let outcome = engine
            .complete_level_at("ana", LevelCoord::first(), &performance(90, 0, 90), now())
            .unwrap();

        assert_eq!(outcome.final_score, 99);
        assert_eq!(outcome.unlocked, vec![LevelCoord::new(1, 2)]);
        assert!(!outcome.chapter_completed);
        assert!(outcome.newly_awarded.contains(&"first_steps".to_string()));
        assert_eq!(outcome.provenance, Provenance::Durable);
    }

    #[test]
    fn test_locked_level_is_a_precondition_error() {
        let engine = engine();
        let err = engine
            .complete_level_at("ana", LevelCoord::new(1, 3), &performance(90, 0, 90), now())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Precondition(PreconditionError::LevelLocked { missing, .. })
                if missing == LevelCoord::new(1, 2)
        ));
    }

    #[test]
    fn test_unknown_level_is_fatal_and_writes_nothing() {
        let engine = engine();
        let err = engine
            .complete_level_at("ana", LevelCoord::new(42, 1), &performance(90, 0, 90), now())
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(engine.store().records_for_user("ana").unwrap().is_empty());
    }

    #[test]
    fn test_statistics_match_records_after_each_completion() {
        let engine = engine();
        for (level, raw) in [(1, 90), (2, 70), (3, 100)] {
            engine
                .complete_level_at(
                    "ana",
                    LevelCoord::new(1, level),
                    &performance(raw, 0, 180),
                    now(),
                )
                .unwrap();

            let records = engine.store().records_for_user("ana").unwrap();
            let expected: u64 = records
                .iter()
                .filter(|r| r.is_completed())
                .map(|r| r.final_score as u64)
                .sum();
            let stats = engine.store().statistics("ana").unwrap().unwrap();
            assert_eq!(stats.total_score, expected);
        }
        let stats = engine.store().statistics("ana").unwrap().unwrap();
        assert_eq!(stats.total_levels_completed, 3);
    }

    #[test]
    fn test_recompletion_keeps_the_best_score() {
        let engine = engine();
        engine
            .complete_level_at("ana", LevelCoord::first(), &performance(90, 0, 90), now())
            .unwrap();
        // Weaker replay of the same level
        engine
            .complete_level_at("ana", LevelCoord::first(), &performance(40, 3, 400), now())
            .unwrap();

        let record = engine
            .store()
            .get("ana", LevelCoord::first())
            .unwrap()
            .unwrap();
        assert_eq!(record.final_score, 99);
        assert_eq!(record.attempts, 2);

        let stats = engine.store().statistics("ana").unwrap().unwrap();
        assert_eq!(stats.total_score, 99);
    }

    #[test]
    fn test_snapshot_reports_entry_level_open() {
        let engine = engine();
        let snapshot = engine.progress_snapshot("newcomer").unwrap();

        assert_eq!(snapshot.chapters.len(), 4);
        let first = &snapshot.chapters[0];
        assert_eq!(first.levels[0].state, LevelState::Unlocked);
        assert_eq!(first.levels[1].state, LevelState::Locked);
        assert_eq!(first.completed_levels, 0);
        assert_eq!(snapshot.statistics.total_levels_completed, 0);
    }

    #[test]
    fn test_rank_and_leaderboard_through_the_engine() {
        let engine = engine();
        engine
            .complete_level_at("ana", LevelCoord::first(), &performance(95, 0, 90), now())
            .unwrap();
        engine
            .complete_level_at("bob", LevelCoord::first(), &performance(55, 2, 300), now())
            .unwrap();

        let board = engine.leaderboard(10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "ana");
        assert_eq!(engine.user_rank("ana").unwrap(), Some(1));
        assert_eq!(engine.user_rank("bob").unwrap(), Some(2));
        assert_eq!(engine.user_rank("nobody").unwrap(), None);
    }

    #[test]
    fn test_reset_user_clears_everything() {
        let engine = engine();
        engine
            .complete_level_at("ana", LevelCoord::first(), &performance(90, 0, 90), now())
            .unwrap();
        engine.reset_user("ana").unwrap();

        assert!(engine.store().records_for_user("ana").unwrap().is_empty());
        assert!(engine.store().statistics("ana").unwrap().is_none());
        assert!(engine.achievements("ana").unwrap().is_empty());
    }
}
