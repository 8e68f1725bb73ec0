//! Chapter definitions and the curriculum they form

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Number of levels a chapter carries unless configured otherwise
pub const DEFAULT_LEVELS_PER_CHAPTER: u32 = 5;

/// Immutable definition of a single chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDefinition {
    /// 1-based chapter id; chapters are strictly ordered by id
    pub id: u32,

    /// Display name shown by callers (never interpreted by the engine)
    pub name: String,

    /// Number of levels in this chapter
    pub total_levels: u32,
}

/// Coordinate of a single level inside the curriculum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelCoord {
    pub chapter: u32,
    pub level: u32,
}

impl LevelCoord {
    pub fn new(chapter: u32, level: u32) -> Self {
        Self { chapter, level }
    }

    /// The implicitly unlocked entry point of the whole curriculum
    pub fn first() -> Self {
        Self::new(1, 1)
    }

    pub fn is_first(&self) -> bool {
        self.chapter == 1 && self.level == 1
    }
}

impl fmt::Display for LevelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chapter {}, level {}", self.chapter, self.level)
    }
}

/// The built-in curriculum used when no chapters are configured
static DEFAULT_CHAPTERS: Lazy<Vec<ChapterDefinition>> = Lazy::new(|| {
    ["Foundations", "Explorations", "Challenges", "Mastery"]
        .iter()
        .enumerate()
        .map(|(i, name)| ChapterDefinition {
            id: i as u32 + 1,
            name: (*name).to_string(),
            total_levels: DEFAULT_LEVELS_PER_CHAPTER,
        })
        .collect()
});

/// The ordered set of chapters the engine gates access through.
///
/// Invalid chapter/level coordinates are configuration errors everywhere in
/// the engine, so all coordinate checks funnel through [`Curriculum::require`].
#[derive(Debug, Clone)]
pub struct Curriculum {
    chapters: Vec<ChapterDefinition>,
}

impl Curriculum {
    /// Build a curriculum from chapter definitions.
    ///
    /// Chapter ids must be contiguous starting at 1 and every chapter needs
    /// at least one level; anything else is a configuration mistake we refuse
    /// to run with.
    pub fn new(chapters: Vec<ChapterDefinition>) -> Result<Self, EngineError> {
        if chapters.is_empty() {
            return Err(EngineError::configuration(
                LevelCoord::first(),
                "curriculum has no chapters",
            ));
        }
        for (i, chapter) in chapters.iter().enumerate() {
            let expected = i as u32 + 1;
            if chapter.id != expected {
                return Err(EngineError::configuration(
                    LevelCoord::new(chapter.id, 1),
                    "chapter ids must be contiguous starting at 1",
                ));
            }
            if chapter.total_levels == 0 {
                return Err(EngineError::configuration(
                    LevelCoord::new(chapter.id, 0),
                    "chapter must have at least one level",
                ));
            }
        }
        Ok(Self { chapters })
    }

    /// Look up a chapter definition by id
    pub fn chapter(&self, id: u32) -> Option<&ChapterDefinition> {
        self.chapters.iter().find(|c| c.id == id)
    }

    /// All chapters in order
    pub fn chapters(&self) -> &[ChapterDefinition] {
        &self.chapters
    }

    /// Number of levels in the given chapter, if it exists
    pub fn total_levels(&self, chapter: u32) -> Option<u32> {
        self.chapter(chapter).map(|c| c.total_levels)
    }

    /// The chapter after `chapter`, if any
    pub fn next_chapter(&self, chapter: u32) -> Option<u32> {
        self.chapter(chapter + 1).map(|c| c.id)
    }

    /// Whether a (chapter, level) coordinate exists in this curriculum
    pub fn contains(&self, coord: LevelCoord) -> bool {
        self.total_levels(coord.chapter)
            .is_some_and(|total| coord.level >= 1 && coord.level <= total)
    }

    /// Validate a coordinate, returning the chapter definition.
    ///
    /// An unknown coordinate is fatal: it means the caller and the engine
    /// disagree about content, not about a user's progress.
    pub fn require(&self, coord: LevelCoord) -> Result<&ChapterDefinition, EngineError> {
        let Some(chapter) = self.chapter(coord.chapter) else {
            return Err(EngineError::configuration(coord, "unknown chapter"));
        };
        if coord.level < 1 || coord.level > chapter.total_levels {
            return Err(EngineError::configuration(coord, "unknown level"));
        }
        Ok(chapter)
    }

    /// Total number of levels across every chapter (completion-rate basis)
    pub fn total_level_count(&self) -> u32 {
        self.chapters.iter().map(|c| c.total_levels).sum()
    }

    /// The coordinate a learner must complete before entering `coord`.
    ///
    /// Steps backward: the previous level of the same chapter, or the last
    /// level of the previous chapter at a chapter boundary. The very first
    /// level has no prerequisite.
    pub fn prerequisite(&self, coord: LevelCoord) -> Option<LevelCoord> {
        if coord.is_first() {
            return None;
        }
        if coord.level > 1 {
            return Some(LevelCoord::new(coord.chapter, coord.level - 1));
        }
        let prev = coord.chapter - 1;
        self.total_levels(prev)
            .map(|total| LevelCoord::new(prev, total))
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self {
            chapters: DEFAULT_CHAPTERS.clone(),
        }
    }
}
