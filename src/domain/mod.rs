//! Core domain types for the progression engine

mod achievement;
mod chapter;
mod level;
mod performance;
mod progress;
mod ranking;
mod statistics;

pub use achievement::{AchievementKind, AchievementRecord};
pub use chapter::{Curriculum, ChapterDefinition, LevelCoord, DEFAULT_LEVELS_PER_CHAPTER};
pub use level::{LevelKind, LevelState};
pub use performance::RawPerformance;
pub use progress::ProgressRecord;
pub use ranking::RankingEntry;
pub use statistics::StatisticsRecord;
