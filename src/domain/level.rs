//! Level kinds and the per-level unlock state

use serde::{Deserialize, Serialize};

/// The kind of mini-experience a level hosts.
///
/// The engine never runs these; the kind only selects the score weight
/// profile. Unrecognized kinds from callers fall back to `Standard`, so
/// content updates can ship new level types without breaking scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Quiz,
    Puzzle,
    Matching,
    #[default]
    Standard,
}

impl LevelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Puzzle => "puzzle",
            Self::Matching => "matching",
            Self::Standard => "standard",
        }
    }

    /// Parse a caller-supplied kind string; anything unknown is `Standard`
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "quiz" => Self::Quiz,
            "puzzle" => Self::Puzzle,
            "matching" => Self::Matching,
            _ => Self::Standard,
        }
    }

    pub fn all() -> &'static [LevelKind] {
        &[Self::Quiz, Self::Puzzle, Self::Matching, Self::Standard]
    }
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unlock state of one (user, chapter, level) record.
///
/// Transitions only move forward: Locked -> Unlocked -> Completed. Both
/// transitions are driven by the engine's own rules, never by a direct
/// client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelState {
    Locked,
    Unlocked,
    Completed,
}

impl LevelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "locked" => Some(Self::Locked),
            "unlocked" => Some(Self::Unlocked),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether the level can be entered (unlock is distinct from completion)
    pub fn is_accessible(&self) -> bool {
        matches!(self, Self::Unlocked | Self::Completed)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Forward-only transition guard
    pub fn can_become(&self, next: LevelState) -> bool {
        use LevelState::*;
        matches!(
            (self, next),
            (Locked, Unlocked) | (Unlocked, Completed) | (Completed, Completed)
        )
    }
}

impl std::fmt::Display for LevelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
