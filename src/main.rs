mod cli;
mod commands;
mod config;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let ctx = Context {
        quiet: cli.quiet,
        config,
    };

    let result = match cli.command {
        Command::Leaves(args) => commands::leaves::run(&ctx, args),
        Command::Snapshot { output } => commands::snapshot::run(&ctx, &output),
        Command::Tx(cmd) => commands::tx::run(&ctx, cmd),
        Command::Config => commands::config::show(&ctx),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "rpmtx", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = &result {
        ui::hint(err);
    }
    result
}
