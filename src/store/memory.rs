//! In-memory store for tests and ephemeral runs

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::{CompletionUnit, ProgressStore, StoreError};
use crate::domain::{AchievementRecord, LevelCoord, ProgressRecord, StatisticsRecord};

#[derive(Default)]
struct MemoryInner {
    /// Keyed by (user_id, chapter, level); BTreeMap keeps listing order stable
    records: BTreeMap<(String, u32, u32), ProgressRecord>,
    statistics: BTreeMap<String, StatisticsRecord>,
    /// Keyed by (user_id, name)
    achievements: BTreeMap<(String, String), AchievementRecord>,
}

/// Store that keeps everything in process memory.
///
/// A commit holds the single inner lock for its whole duration, which gives
/// the same all-or-nothing visibility a SQLite transaction does.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    fn write_unit(inner: &mut MemoryInner, unit: &CompletionUnit) {
        for record in &unit.records {
            inner.records.insert(
                (record.user_id.clone(), record.chapter, record.level),
                record.clone(),
            );
        }
        inner
            .statistics
            .insert(unit.statistics.user_id.clone(), unit.statistics.clone());
        for award in &unit.awards {
            inner
                .achievements
                .entry((award.user_id.clone(), award.name.clone()))
                .or_insert_with(|| award.clone());
        }
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, user_id: &str, coord: LevelCoord) -> Result<Option<ProgressRecord>, StoreError> {
        let inner = self.inner();
        Ok(inner
            .records
            .get(&(user_id.to_string(), coord.chapter, coord.level))
            .cloned())
    }

    fn records_for_user(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let inner = self.inner();
        Ok(inner
            .records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn all_records(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        let inner = self.inner();
        Ok(inner.records.values().cloned().collect())
    }

    fn upsert(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let mut inner = self.inner();
        inner.records.insert(
            (record.user_id.clone(), record.chapter, record.level),
            record.clone(),
        );
        Ok(())
    }

    fn statistics(&self, user_id: &str) -> Result<Option<StatisticsRecord>, StoreError> {
        let inner = self.inner();
        Ok(inner.statistics.get(user_id).cloned())
    }

    fn put_statistics(&self, stats: &StatisticsRecord) -> Result<(), StoreError> {
        let mut inner = self.inner();
        inner.statistics.insert(stats.user_id.clone(), stats.clone());
        Ok(())
    }

    fn achievements(&self, user_id: &str) -> Result<Vec<AchievementRecord>, StoreError> {
        let inner = self.inner();
        Ok(inner
            .achievements
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn achievement_counts(&self) -> Result<HashMap<String, u32>, StoreError> {
        let inner = self.inner();
        let mut counts: HashMap<String, u32> = HashMap::new();
        for (user_id, _) in inner.achievements.keys() {
            *counts.entry(user_id.clone()).or_default() += 1;
        }
        Ok(counts)
    }

    fn award(&self, achievement: &AchievementRecord) -> Result<bool, StoreError> {
        let mut inner = self.inner();
        let key = (achievement.user_id.clone(), achievement.name.clone());
        if inner.achievements.contains_key(&key) {
            return Ok(false);
        }
        inner.achievements.insert(key, achievement.clone());
        Ok(true)
    }

    fn commit_unit(&self, unit: &CompletionUnit) -> Result<(), StoreError> {
        let mut inner = self.inner();
        Self::write_unit(&mut inner, unit);
        Ok(())
    }

    fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner();
        inner.records.retain(|(user, _, _), _| user != user_id);
        inner.statistics.remove(user_id);
        inner.achievements.retain(|(user, _), _| user != user_id);
        Ok(())
    }
}
