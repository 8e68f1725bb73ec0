//! Achievement triggers
//!
//! The engine hands every completion to a trigger and persists whatever it
//! grants. Identity lives entirely in the trigger, so swapping the rule set
//! never touches the engine.

mod milestones;
mod trigger;

pub use milestones::MilestoneTrigger;
pub use trigger::{AchievementGrant, AchievementTrigger, CompletionContext, NoAchievements};
