//! Score engine
//!
//! Turns raw performance plus elapsed time and hint usage into a final
//! integer score, weighted by a per-level-type profile. Pure: no clock, no
//! storage, same inputs give the same output.

mod profile;

pub use profile::{ScoreProfile, ScoreProfiles};

use crate::domain::RawPerformance;

/// Floor for the speed multiplier (very slow runs cost at most half the bonus)
const MIN_TIME_MULTIPLIER: f64 = 0.5;
/// Cap for the speed multiplier (very fast runs double the bonus at most)
const MAX_TIME_MULTIPLIER: f64 = 2.0;

/// Compute the final score for one completion.
///
/// `base = raw * accuracy_weight`, plus a speed bonus of
/// `raw * speed_weight * multiplier` where the multiplier compares par time
/// to actual time, minus `hints * hint_penalty_per_hint`. Clamped at zero
/// and rounded to the nearest integer. Numeric edge cases (missing times,
/// zero elapsed, hint penalties larger than the score) are clamped, never
/// errors.
pub fn compute_final_score(performance: &RawPerformance, profile: &ScoreProfile) -> u32 {
    let raw = performance.raw_score.min(100) as f64;
    let base = raw * profile.accuracy_weight;
    let multiplier = time_multiplier(performance.elapsed_secs(), profile.estimated_time_secs);
    let time_bonus = raw * profile.speed_weight * multiplier;
    let hint_penalty = performance.hints_used as f64 * profile.hint_penalty_per_hint;

    (base + time_bonus - hint_penalty).max(0.0).round() as u32
}

fn time_multiplier(elapsed_secs: Option<i64>, estimated_time_secs: u32) -> f64 {
    match elapsed_secs {
        Some(secs) if secs > 0 && estimated_time_secs > 0 => {
            (estimated_time_secs as f64 / secs as f64)
                .clamp(MIN_TIME_MULTIPLIER, MAX_TIME_MULTIPLIER)
        }
        _ => 1.0,
    }
}
