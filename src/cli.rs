use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use rpmkit::{IdentityFilter, OperationMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rpmtx")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Track pending package operations and find leaf packages", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/rpmtx/config.toml)
    #[arg(long, global = true, env = "RPMTX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List installed packages that nothing else requires
    Leaves(LeavesArgs),

    /// Capture the installed-package database to a JSON snapshot
    Snapshot {
        /// Output file
        output: PathBuf,
    },

    /// Manage the pending transaction
    #[command(subcommand)]
    Tx(TxCommand),

    /// Show the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Leaves
// ============================================================================

#[derive(Args)]
pub struct LeavesArgs {
    /// Read packages from a JSON snapshot instead of the rpm database
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Only print the number of leaf packages
    #[arg(short, long)]
    pub count: bool,
}

// ============================================================================
// Transaction Commands
// ============================================================================

#[derive(Subcommand)]
pub enum TxCommand {
    /// Add a package operation (package as name-[epoch:]version-release.arch)
    Add {
        /// Package identity
        package: String,

        /// Operation to perform
        #[arg(short, long, value_enum, default_value_t = ModeArg::Install)]
        mode: ModeArg,

        /// Mark as pulled in by a dependency rather than requested
        #[arg(long)]
        dep: bool,
    },

    /// Remove every operation for a package
    #[command(alias = "rm")]
    Remove {
        /// Package identity
        package: String,
    },

    /// Change the operation for a package already in the transaction
    Mode {
        /// Package identity
        package: String,

        /// New operation
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Look up the operation for packages matching a filter
    Query(QueryArgs),

    /// Show the pending transaction
    Show,

    /// Discard the pending transaction
    Clear,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    Install,
    Upgrade,
    Erase,
}

impl From<ModeArg> for OperationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Install => OperationMode::Install,
            ModeArg::Upgrade => OperationMode::Upgrade,
            ModeArg::Erase => OperationMode::Erase,
        }
    }
}

#[derive(Args, Default)]
pub struct QueryArgs {
    /// Package name
    #[arg(long)]
    pub name: Option<String>,

    /// Architecture
    #[arg(long)]
    pub arch: Option<String>,

    /// Epoch
    #[arg(long)]
    pub epoch: Option<String>,

    /// Version
    #[arg(id = "ver", long = "ver")]
    pub version: Option<String>,

    /// Release
    #[arg(id = "rel", long = "rel")]
    pub release: Option<String>,
}

impl QueryArgs {
    pub fn into_filter(self) -> IdentityFilter {
        IdentityFilter {
            name: self.name,
            arch: self.arch,
            epoch: self.epoch,
            version: self.version,
            release: self.release,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tx_add() {
        let cli = Cli::try_parse_from([
            "rpmtx",
            "tx",
            "add",
            "bash-5.2.26-3.fc40.x86_64",
            "--mode",
            "upgrade",
            "--dep",
        ])
        .unwrap();

        match cli.command {
            Command::Tx(TxCommand::Add { package, mode, dep }) => {
                assert_eq!(package, "bash-5.2.26-3.fc40.x86_64");
                assert_eq!(mode, ModeArg::Upgrade);
                assert!(dep);
            }
            _ => panic!("expected tx add"),
        }
    }

    #[test]
    fn test_parse_leaves_with_globals() {
        let cli =
            Cli::try_parse_from(["rpmtx", "leaves", "-vv", "--snapshot", "db.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Leaves(args) => {
                assert_eq!(args.snapshot, Some(PathBuf::from("db.json")));
                assert!(!args.count);
            }
            _ => panic!("expected leaves"),
        }
    }

    #[test]
    fn test_query_args_into_filter() {
        let cli = Cli::try_parse_from(["rpmtx", "tx", "query", "--name", "bash", "--rel", "1"])
            .unwrap();
        let Command::Tx(TxCommand::Query(args)) = cli.command else {
            panic!("expected tx query");
        };
        let filter = args.into_filter();
        assert_eq!(filter.name.as_deref(), Some("bash"));
        assert_eq!(filter.release.as_deref(), Some("1"));
        assert!(filter.arch.is_none());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["rpmtx", "tx", "mode", "a-1-1.noarch", "obsolete"]).is_err());
    }
}
