//! Pending transaction management.

use anyhow::{Context as _, Result};
use rpmkit::{OperationMode, PackageIdentity, Reason, Transaction};
use std::path::Path;

use crate::Context;
use crate::cli::TxCommand;
use crate::state::PendingTransaction;
use crate::ui;

pub fn run(ctx: &Context, cmd: TxCommand) -> Result<()> {
    let path = ctx.config.transaction_path()?;
    run_at(&path, cmd, ctx.quiet)
}

/// Run a transaction command against the state file at `path`.
fn run_at(path: &Path, cmd: TxCommand, quiet: bool) -> Result<()> {
    let mut pending = PendingTransaction::load(path)?;

    match cmd {
        TxCommand::Add { package, mode, dep } => {
            let identity = parse_identity(&package)?;
            let mode = OperationMode::from(mode);
            let reason = if dep {
                Reason::DependencyPulled
            } else {
                Reason::UserRequested
            };
            pending.transaction.add(identity.clone(), mode.clone(), reason);
            pending.touch(path)?;
            if !quiet {
                ui::success(&format!("Queued {identity} for {mode}"));
            }
        }
        TxCommand::Remove { package } => {
            let identity = parse_identity(&package)?;
            if pending.transaction.remove(&identity) {
                pending.touch(path)?;
                if !quiet {
                    ui::success(&format!("Removed {identity} from the transaction"));
                }
            } else {
                ui::warn(&format!("{identity} is not in the transaction"));
            }
        }
        TxCommand::Mode { package, mode } => {
            let identity = parse_identity(&package)?;
            let mode = OperationMode::from(mode);
            pending
                .transaction
                .change_mode(&identity, mode.clone())
                .with_context(|| format!("Cannot change mode of {identity}"))?;
            pending.touch(path)?;
            if !quiet {
                ui::success(&format!("{identity} will now {mode}"));
            }
        }
        TxCommand::Query(args) => {
            let filter = args.into_filter();
            let matches = pending
                .transaction
                .iter()
                .filter(|e| filter.matches(&e.identity))
                .count();
            match pending.transaction.get_mode(&filter) {
                Some(mode) => {
                    println!("{mode}");
                    if matches > 1 {
                        ui::warn(&format!(
                            "{matches} entries match; give every field for a definite answer"
                        ));
                    }
                }
                None => {
                    if !quiet {
                        ui::info("No matching package in the transaction");
                    }
                }
            }
        }
        TxCommand::Show => {
            show(&pending, quiet);
        }
        TxCommand::Clear => {
            let count = pending.transaction.count();
            pending.transaction.clear();
            pending.touch(path)?;
            if !quiet {
                ui::success(&format!("Discarded {count} pending operations"));
            }
        }
    }

    Ok(())
}

fn parse_identity(package: &str) -> Result<PackageIdentity> {
    package
        .parse()
        .with_context(|| format!("Expected name-[epoch:]version-release.arch, got '{package}'"))
}

/// Print the pending transaction; returns the number of entry lines printed.
fn show(pending: &PendingTransaction, quiet: bool) -> usize {
    let tx: &Transaction = &pending.transaction;
    if tx.is_empty() {
        if !quiet {
            ui::info("Transaction is empty");
        }
        return 0;
    }

    if !quiet {
        ui::header("Pending Transaction");
    }
    let listing = tx.display();
    for line in listing.lines() {
        println!("  {line}");
    }
    if !quiet {
        println!();
        ui::dim(&format!(
            "{} entries, last updated {}",
            tx.count(),
            pending.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    listing.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ModeArg, QueryArgs};
    use rpmkit::IdentityFilter;
    use tempfile::TempDir;

    const BASH: &str = "bash-5.2.26-3.fc40.x86_64";

    fn add(path: &Path, package: &str, mode: ModeArg, dep: bool) {
        run_at(
            path,
            TxCommand::Add {
                package: package.to_string(),
                mode,
                dep,
            },
            true,
        )
        .unwrap();
    }

    #[test]
    fn test_add_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        add(&path, BASH, ModeArg::Upgrade, true);
        add(&path, BASH, ModeArg::Upgrade, true);

        let pending = PendingTransaction::load(&path).unwrap();
        let bash: PackageIdentity = BASH.parse().unwrap();
        assert_eq!(pending.transaction.count(), 1);
        assert_eq!(
            pending.transaction.reason(&bash),
            Some(&Reason::DependencyPulled)
        );
    }

    #[test]
    fn test_mode_change_keeps_reason() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        add(&path, BASH, ModeArg::Install, false);
        run_at(
            &path,
            TxCommand::Mode {
                package: BASH.to_string(),
                mode: ModeArg::Erase,
            },
            true,
        )
        .unwrap();

        let pending = PendingTransaction::load(&path).unwrap();
        assert_eq!(
            pending.transaction.display(),
            "[e] bash.x86_64 0:5.2.26-3.fc40 - user\n"
        );
    }

    #[test]
    fn test_mode_change_of_unknown_package_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        let result = run_at(
            &path,
            TxCommand::Mode {
                package: BASH.to_string(),
                mode: ModeArg::Erase,
            },
            true,
        );
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        add(&path, BASH, ModeArg::Install, false);
        add(&path, "zsh-5.9-15.fc40.x86_64", ModeArg::Install, false);
        run_at(
            &path,
            TxCommand::Remove {
                package: BASH.to_string(),
            },
            true,
        )
        .unwrap();

        let pending = PendingTransaction::load(&path).unwrap();
        let bash: PackageIdentity = BASH.parse().unwrap();
        assert_eq!(pending.transaction.count(), 1);
        assert_eq!(
            pending.transaction.get_mode(&IdentityFilter::exact(&bash)),
            None
        );

        run_at(&path, TxCommand::Clear, true).unwrap();
        assert!(PendingTransaction::load(&path).unwrap().transaction.is_empty());
    }

    #[test]
    fn test_query_and_show_do_not_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        run_at(&path, TxCommand::Show, true).unwrap();
        run_at(
            &path,
            TxCommand::Query(QueryArgs {
                name: Some("bash".to_string()),
                ..Default::default()
            }),
            true,
        )
        .unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_malformed_identity() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tx.toml");

        let result = run_at(
            &path,
            TxCommand::Add {
                package: "bash".to_string(),
                mode: ModeArg::Install,
                dep: false,
            },
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_show_prints_only_entries() {
        let mut pending = PendingTransaction::default();
        assert_eq!(show(&pending, true), 0);

        pending.transaction.add(
            BASH.parse().unwrap(),
            OperationMode::Install,
            Reason::UserRequested,
        );
        pending.transaction.add(
            "zsh-5.9-15.fc40.x86_64".parse().unwrap(),
            OperationMode::Erase,
            Reason::DependencyPulled,
        );
        assert_eq!(show(&pending, true), 2);
    }
}
