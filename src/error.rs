//! Error taxonomy for the progression engine
//!
//! Three classes, three handling rules:
//! - configuration errors are fatal and abort the operation
//! - precondition errors are expected domain outcomes, reported back to the
//!   caller with the exact unmet requirement
//! - storage errors may be transient; the engine retries those before giving
//!   up and surfacing the failure

use crate::domain::LevelCoord;
use crate::store::StoreError;

/// Top-level error type returned by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Broken content or settings (unknown chapter, malformed curriculum)
    #[error("configuration error at {coord}: {reason}")]
    Configuration { coord: LevelCoord, reason: String },

    /// A progression rule was not met; carries the structured reason
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The persistence layer failed after retries were exhausted
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl EngineError {
    pub fn configuration(coord: LevelCoord, reason: impl Into<String>) -> Self {
        EngineError::Configuration {
            coord,
            reason: reason.into(),
        }
    }

    /// Fatal errors indicate operator mistakes, not user ones
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Configuration { .. })
    }
}

/// Unmet progression requirements.
///
/// These are not failures of the engine: they are answers. Each variant
/// names the exact level that blocked the request so a caller can show the
/// learner what to do next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// The level exists but the user has not reached it yet
    #[error("{coord} is locked: complete {missing} first")]
    LevelLocked {
        coord: LevelCoord,
        /// The prerequisite that has not been completed
        missing: LevelCoord,
    },

    /// Completion was reported for a level never unlocked for this user
    #[error("{coord} must be unlocked before it can be completed")]
    NotUnlocked { coord: LevelCoord },

    /// An unlock was requested from a level that is not completed yet
    #[error("{coord} is not completed, nothing to unlock after it")]
    NotCompleted { coord: LevelCoord },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_messages_name_the_level() {
        let err = PreconditionError::LevelLocked {
            coord: LevelCoord::new(2, 3),
            missing: LevelCoord::new(2, 2),
        };
        assert_eq!(
            err.to_string(),
            "chapter 2, level 3 is locked: complete chapter 2, level 2 first"
        );

        let err = PreconditionError::NotUnlocked {
            coord: LevelCoord::new(1, 4),
        };
        assert!(err.to_string().contains("chapter 1, level 4"));
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        let config = EngineError::configuration(LevelCoord::first(), "no chapters");
        assert!(config.is_fatal());

        let precondition: EngineError = PreconditionError::NotUnlocked {
            coord: LevelCoord::first(),
        }
        .into();
        assert!(!precondition.is_fatal());
    }
}
