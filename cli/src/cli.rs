// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use futures::{FutureExt, future::LocalBoxFuture};
use taskbridge_core::{APP_NAME, SyncEngine};
use tracing_subscriber::EnvFilter;

use crate::arg::CommonArgs;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_lists::CmdLists;
use crate::cmd_sync::{CmdPruneCompleted, CmdSync};
use crate::config::parse_config;

const TASKBRIDGE_LOG_ENV: &str = "TASKBRIDGE_LOG";

/// Run the TaskBridge command-line interface.
pub async fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose);
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr, filtered by `TASKBRIDGE_LOG` (e.g. `taskbridge_core=debug`).
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(TASKBRIDGE_LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Whether to log progress
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Keep local reminders and CalDAV tasks in sync.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // allow default to sync
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $TASKBRIDGE_CONFIG, then \
$XDG_CONFIG_HOME/taskbridge/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/taskbridge/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath)
                    .global(true),
            )
            .arg(CommonArgs::verbose())
            .subcommand(CmdSync::command())
            .subcommand(CmdLists::command())
            .subcommand(CmdPruneCompleted::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Ok(Self::from(&matches))
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Ok(Self::from(&matches))
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Self {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some((CmdLists::NAME, matches)) => Lists(CmdLists::from(matches)),
            Some((CmdPruneCompleted::NAME, matches)) => {
                PruneCompleted(CmdPruneCompleted::from(matches))
            }
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches))
            }
            _ => Sync(CmdSync::default()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = CommonArgs::get_verbose(matches);
        Cli {
            config,
            verbose,
            command,
        }
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Synchronize both stores
    Sync(CmdSync),

    /// Show lists and calendars
    Lists(CmdLists),

    /// Delete completed local reminders
    PruneCompleted(CmdPruneCompleted),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Sync(a)           => Self::run_with(config, a.dry_run, |x| a.run(x).boxed_local()).await,
            Lists(a)          => Self::run_with(config, false, |x| a.run(x).boxed_local()).await,
            PruneCompleted(a) => Self::run_with(config, a.dry_run, |x| a.run(x).boxed_local()).await,
            GenerateCompletion(a) => a.run(),
        }
    }

    async fn run_with<F>(
        config: Option<PathBuf>,
        dry_run: bool,
        f: F,
    ) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a SyncEngine) -> LocalBoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let mut config = parse_config(config).await?;
        config.dry_run |= dry_run;
        let engine = SyncEngine::from_config(&config).await?;

        f(&engine).await
    }
}
