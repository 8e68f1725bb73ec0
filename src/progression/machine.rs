//! Progression state machine

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::domain::{Curriculum, LevelCoord, LevelState, ProgressRecord};
use crate::error::{EngineError, PreconditionError};

/// One user's progress records, loaded into memory for a unit of work.
///
/// The machine mutates this view; the records it touched are collected with
/// [`UserProgress::take_dirty`] and committed in one store transaction.
#[derive(Debug, Default)]
pub struct UserProgress {
    records: BTreeMap<LevelCoord, ProgressRecord>,
    dirty: BTreeSet<LevelCoord>,
}

impl UserProgress {
    pub fn from_records(records: Vec<ProgressRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.coord(), r)).collect(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn get(&self, coord: LevelCoord) -> Option<&ProgressRecord> {
        self.records.get(&coord)
    }

    /// Effective state of a level; a missing record means locked
    pub fn state(&self, coord: LevelCoord) -> LevelState {
        self.records
            .get(&coord)
            .map(|r| r.state)
            .unwrap_or(LevelState::Locked)
    }

    pub fn is_completed(&self, coord: LevelCoord) -> bool {
        self.state(coord).is_completed()
    }

    /// Records in (chapter, level) order
    pub fn records(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records.values()
    }

    pub fn completed_in_chapter(&self, chapter: u32) -> u32 {
        self.records
            .values()
            .filter(|r| r.chapter == chapter && r.is_completed())
            .count() as u32
    }

    /// Records mutated since the view was loaded, in coordinate order
    pub fn take_dirty(&mut self) -> Vec<ProgressRecord> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter_map(|coord| self.records.get(&coord).cloned())
            .collect()
    }

    fn insert(&mut self, record: ProgressRecord) {
        self.dirty.insert(record.coord());
        self.records.insert(record.coord(), record);
    }

    fn record_mut(&mut self, coord: LevelCoord) -> Option<&mut ProgressRecord> {
        self.dirty.insert(coord);
        self.records.get_mut(&coord)
    }
}

/// Outcome of evaluating unlocks after a completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// Levels that changed from locked to unlocked in this call
    pub unlocked: Vec<LevelCoord>,
    /// Every level of the chapter is now completed
    pub chapter_completed: bool,
    /// The chapter was the last one; there is nothing left to unlock
    pub content_exhausted: bool,
}

/// Result of an access check. A denied check names the prerequisite so the
/// caller can tell the learner exactly what to finish first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCheck {
    Granted,
    Denied { missing: LevelCoord },
}

impl AccessCheck {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessCheck::Granted)
    }
}

/// The unlock state machine over one user's progress view.
///
/// Transitions are strictly forward: LOCKED to UNLOCKED to COMPLETED, both
/// driven by engine rules rather than by direct client request. All methods
/// are pure over the passed-in view; persistence happens elsewhere.
pub struct ProgressionMachine {
    curriculum: Curriculum,
}

impl ProgressionMachine {
    pub fn new(curriculum: Curriculum) -> Self {
        Self { curriculum }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Record a completion for an unlocked (or re-completed) level.
    ///
    /// The very first level needs no prior record: it is implicitly
    /// unlocked for every user. Everywhere else a missing or locked record
    /// rejects the completion.
    #[allow(clippy::too_many_arguments)]
    pub fn mark_level_completed(
        &self,
        progress: &mut UserProgress,
        user_id: &str,
        coord: LevelCoord,
        raw_score: u32,
        final_score: u32,
        hints_used: u32,
        elapsed_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        self.curriculum.require(coord)?;

        if progress.get(coord).is_none() && coord.is_first() {
            progress.insert(ProgressRecord::unlocked(user_id, coord, now));
        }

        match progress.state(coord) {
            // Point at the prerequisite when the curriculum has one; the
            // entry level has none to name
            LevelState::Locked => match self.curriculum.prerequisite(coord) {
                Some(missing) => Err(PreconditionError::LevelLocked { coord, missing }.into()),
                None => Err(PreconditionError::NotUnlocked { coord }.into()),
            },
            LevelState::Unlocked | LevelState::Completed => {
                let record = progress
                    .record_mut(coord)
                    .ok_or(PreconditionError::NotUnlocked { coord })?;
                record.record_completion(raw_score, final_score, hints_used, elapsed_secs, now);
                Ok(())
            }
        }
    }

    /// Evaluate unlocks after `coord` was completed.
    ///
    /// Mid-chapter, the next level of the same chapter unlocks. At the
    /// chapter boundary, a fully completed chapter unlocks level 1 of the
    /// next chapter. Already-unlocked targets are left untouched, so
    /// repeated calls are idempotent.
    pub fn unlock_next(
        &self,
        progress: &mut UserProgress,
        user_id: &str,
        coord: LevelCoord,
        now: DateTime<Utc>,
    ) -> Result<UnlockOutcome, EngineError> {
        let chapter = self.curriculum.require(coord)?;

        if !progress.is_completed(coord) {
            return Err(PreconditionError::NotCompleted { coord }.into());
        }

        let mut outcome = UnlockOutcome::default();

        if coord.level < chapter.total_levels {
            let next = LevelCoord::new(coord.chapter, coord.level + 1);
            if progress.get(next).is_none() {
                progress.insert(ProgressRecord::unlocked(user_id, next, now));
                outcome.unlocked.push(next);
            }
            return Ok(outcome);
        }

        // Last level of the chapter: check the whole chapter before crossing
        // the boundary
        if progress.completed_in_chapter(coord.chapter) == chapter.total_levels {
            outcome.chapter_completed = true;
            match self.curriculum.next_chapter(coord.chapter) {
                Some(next_chapter) => {
                    let next = LevelCoord::new(next_chapter, 1);
                    if progress.get(next).is_none() {
                        progress.insert(ProgressRecord::unlocked(user_id, next, now));
                        outcome.unlocked.push(next);
                    }
                }
                None => outcome.content_exhausted = true,
            }
        }

        Ok(outcome)
    }

    /// Check whether a level is enterable for this user.
    ///
    /// The first level of the first chapter is always accessible. A locked
    /// level answers with its immediate prerequisite: the previous level,
    /// or the last level of the previous chapter at a chapter start.
    pub fn validate_access(
        &self,
        progress: &UserProgress,
        coord: LevelCoord,
    ) -> Result<AccessCheck, EngineError> {
        self.curriculum.require(coord)?;

        if coord.is_first() || progress.state(coord).is_accessible() {
            return Ok(AccessCheck::Granted);
        }

        let Some(missing) = self.curriculum.prerequisite(coord) else {
            return Ok(AccessCheck::Granted);
        };
        Ok(AccessCheck::Denied { missing })
    }
}
