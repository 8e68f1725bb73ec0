//! Statistics aggregation and streak tracking
//!
//! The statistics rollup is a projection of the progress records: totals
//! and averages come from a full scan, never from incremented counters.
//! Only the streak carries independent day-to-day state.

mod aggregator;
mod streak;

pub use aggregator::recompute_statistics;
pub use streak::{StreakUpdate, advance_streak};
