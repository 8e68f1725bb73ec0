//! Complete command implementation

use anyhow::Result;
use std::path::Path;

use chrono::{Duration, Utc};

use questline::domain::{LevelCoord, LevelKind, RawPerformance};
use questline::error::EngineError;
use questline::store::Provenance;

/// Record a completed level for a user and report what it unlocked
#[allow(clippy::too_many_arguments)]
pub async fn complete_command(
    config_path: Option<&Path>,
    user: &str,
    chapter: u32,
    level: u32,
    score: u32,
    hints: u32,
    time_secs: Option<u32>,
    kind: &str,
) -> Result<()> {
    let engine = super::build_engine(config_path)?;
    let coord = LevelCoord::new(chapter, level);

    let mut performance = RawPerformance::new(score, hints, LevelKind::parse(kind));
    if let Some(secs) = time_secs {
        let ended_at = Utc::now();
        performance = performance.with_times(ended_at - Duration::seconds(secs as i64), ended_at);
    }

    let outcome = match engine.complete_level(user, coord, &performance) {
        Ok(outcome) => outcome,
        // The caller can fix these and try again; report without a stack of
        // context
        Err(EngineError::Precondition(err)) => {
            eprintln!("Cannot complete {}: {}", coord, err);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!(
        "{} completed {} with a final score of {}",
        user, coord, outcome.final_score
    );

    for unlocked in &outcome.unlocked {
        println!("  Unlocked: {}", unlocked);
    }
    if outcome.chapter_completed {
        println!("  Chapter {} is complete!", chapter);
    }
    if outcome.content_exhausted {
        println!("  Every chapter is finished.");
    }
    for name in &outcome.newly_awarded {
        println!("  Achievement earned: {}", name);
    }
    if outcome.provenance == Provenance::Degraded {
        println!("  (recorded locally; the durable store is unreachable)");
    }

    Ok(())
}
