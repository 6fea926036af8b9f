//! Diagnostic CLI for titlebar passthrough regions.
//!
//! `replay` drives a [`titlebar_runtime::PassthroughHost`] over the mock
//! platform with a scripted mount/layout/unmount sequence and prints the
//! applied passthrough set after every step. `windows` lists the top-level
//! windows seen by the registered platform.

mod commands;
mod util;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{replay, windows};
use crate::util::CliResult;

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "TITLEBAR_LOG";

#[derive(Parser, Debug)]
#[command(name = "titlebar-cli", version, about = "Inspect and replay titlebar passthrough regions")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). Overrides TITLEBAR_LOG.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON script of mount/layout/unmount events against the mock platform.
    Replay(replay::ReplayArgs),
    /// List top-level windows and mark the one passthrough regions would target.
    Windows(windows::WindowsArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match &cli.command {
        Command::Replay(args) => replay::run(args)?,
        Command::Windows(args) => windows::run(&titlebar_runtime::discover_platform(), args)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
