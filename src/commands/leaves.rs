//! List installed packages that nothing else requires.

use anyhow::{Context as _, Result};
use rpmkit::PackageIdentity;
use std::collections::BTreeSet;

use crate::Context;
use crate::cli::LeavesArgs;
use crate::commands::open_client;
use crate::ui;

pub fn run(ctx: &Context, args: LeavesArgs) -> Result<()> {
    let client = open_client(ctx, args.snapshot.as_deref())?;
    let leaves = client
        .leaves()
        .context("Failed to query installed packages")?;

    if args.count {
        println!("{}", leaves.len());
        return Ok(());
    }

    print_leaves(&leaves, ctx.quiet);
    Ok(())
}

/// Print the listing; returns the number of package rows printed.
fn print_leaves(leaves: &BTreeSet<PackageIdentity>, quiet: bool) -> usize {
    if leaves.is_empty() {
        if !quiet {
            ui::info("No leaf packages found");
        }
        return 0;
    }

    if !quiet {
        ui::header(&format!("Leaf Packages ({})", leaves.len()));
    }
    for pkg in leaves {
        println!("{}", format_row(pkg));
    }
    leaves.len()
}

/// One package per line: name, arch and version in fixed columns.
fn format_row(pkg: &PackageIdentity) -> String {
    format!(
        "{:<36}{:<7}{:<25}",
        pkg.name(),
        pkg.arch(),
        pkg.version_string()
    )
    .trim_end()
    .to_string()
}
