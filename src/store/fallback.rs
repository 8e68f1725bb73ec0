//! Fallback wrapper that degrades to a local store
//!
//! Wraps a durable primary store and a local secondary. While the primary
//! answers, every committed unit is mirrored into the local store so it
//! stays warm. The first transient primary failure flips the wrapper into
//! degraded mode: reads and writes are served locally, writes are journaled,
//! and `reconcile` replays the journal into the primary in commit order once
//! it is reachable again.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CompletionUnit, ProgressStore, Provenance, StoreError};
use crate::domain::{AchievementRecord, LevelCoord, ProgressRecord, StatisticsRecord};

pub struct FallbackStore<P, L> {
    primary: P,
    local: L,
    degraded: AtomicBool,
    journal: Mutex<Vec<CompletionUnit>>,
}

impl<P: ProgressStore, L: ProgressStore> FallbackStore<P, L> {
    pub fn new(primary: P, local: L) -> Self {
        Self {
            primary,
            local,
            degraded: AtomicBool::new(false),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Units committed locally that have not reached the primary yet
    pub fn pending_replay(&self) -> usize {
        self.journal().len()
    }

    fn journal(&self) -> std::sync::MutexGuard<'_, Vec<CompletionUnit>> {
        self.journal.lock().expect("fallback journal lock poisoned")
    }

    fn enter_degraded(&self, err: &StoreError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            tracing::warn!("durable store unavailable, switching to local store: {}", err);
        }
    }

    /// Route a read: primary while healthy, local once degraded. A transient
    /// primary failure flips to degraded and answers locally; hard failures
    /// pass through unchanged.
    fn read<T>(
        &self,
        from_primary: impl FnOnce(&P) -> Result<T, StoreError>,
        from_local: impl FnOnce(&L) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if self.is_degraded() {
            return from_local(&self.local);
        }
        match from_primary(&self.primary) {
            Ok(value) => Ok(value),
            Err(err) if err.is_transient() => {
                self.enter_degraded(&err);
                from_local(&self.local)
            }
            Err(err) => Err(err),
        }
    }

    /// Replay journaled units into the primary, oldest first.
    ///
    /// Units replay in commit order, so for any record the last local write
    /// wins in the primary too. On success the wrapper leaves degraded mode;
    /// a failing unit stays queued along with everything after it.
    pub fn reconcile(&self) -> Result<usize, StoreError> {
        let pending: Vec<CompletionUnit> = self.journal().clone();
        let mut replayed = 0;
        let mut failure = None;
        for unit in &pending {
            match self.primary.commit_unit(unit) {
                Ok(()) => replayed += 1,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        // Drop the replayed prefix; anything after a failure stays queued
        self.journal().drain(..replayed);
        if let Some(err) = failure {
            return Err(err);
        }
        if self.degraded.swap(false, Ordering::SeqCst) {
            tracing::info!("durable store reachable again, replayed {} unit(s)", replayed);
        }
        Ok(replayed)
    }
}

impl<P: ProgressStore, L: ProgressStore> ProgressStore for FallbackStore<P, L> {
    fn get(&self, user_id: &str, coord: LevelCoord) -> Result<Option<ProgressRecord>, StoreError> {
        self.read(|p| p.get(user_id, coord), |l| l.get(user_id, coord))
    }

    fn records_for_user(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        self.read(|p| p.records_for_user(user_id), |l| l.records_for_user(user_id))
    }

    fn all_records(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        self.read(|p| p.all_records(), |l| l.all_records())
    }

    fn upsert(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        if self.is_degraded() {
            return self.local.upsert(record);
        }
        match self.primary.upsert(record) {
            Ok(()) => self.local.upsert(record),
            Err(err) if err.is_transient() => {
                self.enter_degraded(&err);
                self.local.upsert(record)
            }
            Err(err) => Err(err),
        }
    }

    fn statistics(&self, user_id: &str) -> Result<Option<StatisticsRecord>, StoreError> {
        self.read(|p| p.statistics(user_id), |l| l.statistics(user_id))
    }

    fn put_statistics(&self, stats: &StatisticsRecord) -> Result<(), StoreError> {
        if self.is_degraded() {
            return self.local.put_statistics(stats);
        }
        match self.primary.put_statistics(stats) {
            Ok(()) => self.local.put_statistics(stats),
            Err(err) if err.is_transient() => {
                self.enter_degraded(&err);
                self.local.put_statistics(stats)
            }
            Err(err) => Err(err),
        }
    }

    fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, StoreError> {
        self.read(|p| p.achievements(user_id), |l| l.achievements(user_id))
    }

    fn achievement_counts(&self) -> Result<HashMap<String, u32>, StoreError> {
        self.read(|p| p.achievement_counts(), |l| l.achievement_counts())
    }

    fn award(&self, achievement: &AchievementRecord) -> Result<bool, StoreError> {
        if self.is_degraded() {
            return self.local.award(achievement);
        }
        match self.primary.award(achievement) {
            Ok(fresh) => {
                self.local.award(achievement)?;
                Ok(fresh)
            }
            Err(err) if err.is_transient() => {
                self.enter_degraded(&err);
                self.local.award(achievement)
            }
            Err(err) => Err(err),
        }
    }

    fn commit_unit(&self, unit: &CompletionUnit) -> Result<(), StoreError> {
        if self.is_degraded() {
            self.local.commit_unit(unit)?;
            self.journal().push(unit.clone());
            return Ok(());
        }
        match self.primary.commit_unit(unit) {
            Ok(()) => self.local.commit_unit(unit),
            Err(err) if err.is_transient() => {
                self.enter_degraded(&err);
                self.local.commit_unit(unit)?;
                self.journal().push(unit.clone());
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        if self.is_degraded() {
            return Err(StoreError::Unavailable(
                "user reset requires the durable store".to_string(),
            ));
        }
        self.primary.delete_user(user_id)?;
        self.local.delete_user(user_id)
    }

    fn provenance(&self) -> Provenance {
        if self.is_degraded() {
            Provenance::Degraded
        } else {
            Provenance::Durable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;

    /// Primary that can be switched off to simulate an outage
    struct FlakyStore {
        inner: MemoryStore,
        down: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                down: AtomicBool::new(false),
            }
        }

        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.down.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("primary down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl ProgressStore for FlakyStore {
        fn get(
            &self,
            user_id: &str,
            coord: LevelCoord,
        ) -> Result<Option<ProgressRecord>, StoreError> {
            self.check()?;
            self.inner.get(user_id, coord)
        }

        fn records_for_user(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
            self.check()?;
            self.inner.records_for_user(user_id)
        }

        fn all_records(&self) -> Result<Vec<ProgressRecord>, StoreError> {
            self.check()?;
            self.inner.all_records()
        }

        fn upsert(&self, record: &ProgressRecord) -> Result<(), StoreError> {
            self.check()?;
            self.inner.upsert(record)
        }

        fn statistics(&self, user_id: &str) -> Result<Option<StatisticsRecord>, StoreError> {
            self.check()?;
            self.inner.statistics(user_id)
        }

        fn put_statistics(&self, stats: &StatisticsRecord) -> Result<(), StoreError> {
            self.check()?;
            self.inner.put_statistics(stats)
        }

        fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, StoreError> {
            self.check()?;
            self.inner.achievements(user_id)
        }

        fn achievement_counts(&self) -> Result<HashMap<String, u32>, StoreError> {
            self.check()?;
            self.inner.achievement_counts()
        }

        fn award(&self, achievement: &AchievementRecord) -> Result<bool, StoreError> {
            self.check()?;
            self.inner.award(achievement)
        }

        fn commit_unit(&self, unit: &CompletionUnit) -> Result<(), StoreError> {
            self.check()?;
            self.inner.commit_unit(unit)
        }

        fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete_user(user_id)
        }
    }

    fn unit(user: &str, final_score: u32) -> CompletionUnit {
        let mut record = ProgressRecord::unlocked(user, LevelCoord::first(), Utc::now());
        record.record_completion(final_score, final_score, 0, 60, Utc::now());
        let mut stats = StatisticsRecord::empty(user);
        stats.total_levels_completed = 1;
        stats.total_score = final_score as u64;
        CompletionUnit {
            records: vec![record],
            statistics: stats,
            awards: Vec::new(),
        }
    }

    #[test]
    fn test_healthy_commits_mirror_to_local() {
        let store = FallbackStore::new(FlakyStore::new(), MemoryStore::new());
        store.commit_unit(&unit("ana", 90)).unwrap();

        assert_eq!(store.provenance(), Provenance::Durable);
        assert_eq!(store.pending_replay(), 0);
        assert_eq!(store.local.records_for_user("ana").unwrap().len(), 1);
    }

    #[test]
    fn test_outage_degrades_and_journals() {
        let store = FallbackStore::new(FlakyStore::new(), MemoryStore::new());
        store.commit_unit(&unit("ana", 90)).unwrap();

        store.primary.set_down(true);
        store.commit_unit(&unit("bob", 80)).unwrap();

        assert!(store.is_degraded());
        assert_eq!(store.provenance(), Provenance::Degraded);
        assert_eq!(store.pending_replay(), 1);
        // Degraded reads come from the mirrored local store
        assert_eq!(store.records_for_user("ana").unwrap().len(), 1);
        assert_eq!(store.records_for_user("bob").unwrap().len(), 1);
    }

    #[test]
    fn test_reconcile_replays_in_order() {
        let store = FallbackStore::new(FlakyStore::new(), MemoryStore::new());
        store.primary.set_down(true);

        // Two commits for the same level; the later one must win
        store.commit_unit(&unit("ana", 70)).unwrap();
        store.commit_unit(&unit("ana", 95)).unwrap();
        assert_eq!(store.pending_replay(), 2);

        store.primary.set_down(false);
        let replayed = store.reconcile().unwrap();
        assert_eq!(replayed, 2);
        assert!(!store.is_degraded());
        assert_eq!(store.pending_replay(), 0);

        let record = store
            .primary
            .get("ana", LevelCoord::first())
            .unwrap()
            .unwrap();
        assert_eq!(record.final_score, 95);
    }

    #[test]
    fn test_reconcile_keeps_journal_on_failure() {
        let store = FallbackStore::new(FlakyStore::new(), MemoryStore::new());
        store.primary.set_down(true);
        store.commit_unit(&unit("ana", 70)).unwrap();

        assert!(store.reconcile().is_err());
        assert!(store.is_degraded());
        assert_eq!(store.pending_replay(), 1);
    }
}
