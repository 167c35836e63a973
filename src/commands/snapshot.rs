//! Capture the installed-package database to a file.

use anyhow::{Context as _, Result};
use std::path::Path;

use crate::Context;
use crate::commands::open_client;
use crate::ui;

pub fn run(ctx: &Context, output: &Path) -> Result<()> {
    let client = open_client(ctx, None)?;
    let snapshot = client
        .snapshot()
        .context("Failed to query installed packages")?;
    snapshot
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !ctx.quiet {
        ui::success(&format!(
            "Captured {} packages to {}",
            snapshot.len(),
            output.display()
        ));
    }
    Ok(())
}
