//! Reset command implementation

use anyhow::{Result, bail};
use std::path::Path;

/// Delete all progress, statistics and achievements for a user
pub async fn reset_command(config_path: Option<&Path>, user: &str, force: bool) -> Result<()> {
    if !force {
        bail!(
            "This deletes every record, statistic and achievement for '{}'.\nUse --force to confirm.",
            user
        );
    }

    let engine = super::build_engine(config_path)?;
    engine.reset_user(user)?;
    println!("Reset all progress for {}.", user);

    Ok(())
}
