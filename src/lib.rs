//! Questline - chapter/level progression and scoring for learning games
//!
//! Questline turns raw play results into durable progression: it normalizes
//! performance into final scores, walks players through a locked/unlocked/
//! completed level graph, keeps per-user statistics and streaks, grants
//! achievements, and ranks everyone on a leaderboard.
//!
//! ## Architecture
//!
//! Every completion runs as one unit of work through
//! [`engine::ProgressionEngine`]: score, state transition, unlock
//! evaluation, statistics rollup and achievement checks commit together or
//! not at all. Storage sits behind [`store::ProgressStore`], with a durable
//! SQLite backend, an in-memory backend for tests, and a fallback wrapper
//! that rides out storage outages locally and replays once the durable
//! store returns.

pub mod achievements;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod progression;
pub mod ranking;
pub mod score;
pub mod stats;
pub mod store;

pub use domain::*;
