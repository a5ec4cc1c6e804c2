// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use taskbridge_core::{SyncEngine, SyncError};

use crate::arg::CommonArgs;
use crate::report_formatter::ReportFormatter;
use crate::util::{OutputFormat, plural};

#[derive(Debug, Clone, Copy)]
pub struct CmdSync {
    pub dry_run: bool,
    pub output_format: OutputFormat,
}

impl Default for CmdSync {
    fn default() -> Self {
        Self {
            dry_run: false,
            output_format: OutputFormat::Table,
        }
    }
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Synchronize local reminders with the CalDAV server")
            .arg(CommonArgs::dry_run())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            dry_run: CommonArgs::get_dry_run(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "synchronizing...");
        let formatter = ReportFormatter::new(self.output_format);

        let report = match engine.run().await {
            Ok(report) => report,
            Err(SyncError::PersistenceFailed { cause, report }) => {
                print!("{}", formatter.format(&report));
                return Err(format!(
                    "Changes were applied but the sync state could not be saved, \
                     the next run may repeat them: {cause}"
                )
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        print!("{}", formatter.format(&report));
        if report.is_success() {
            Ok(())
        } else {
            Err(format!("{} did not succeed", plural(report.failed.len(), "operation")).into())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CmdPruneCompleted {
    pub dry_run: bool,
}

impl CmdPruneCompleted {
    pub const NAME: &str = "prune-completed";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Delete completed reminders from the local store")
            .arg(CommonArgs::dry_run())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            dry_run: CommonArgs::get_dry_run(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "pruning completed reminders...");
        let count = engine.prune_completed().await?;
        let reminders = plural(count, "completed reminder");
        if count == 0 {
            println!("{}", "No completed reminders".italic());
        } else if engine.is_dry_run() {
            println!("Would delete {reminders}");
        } else {
            println!("Deleted {reminders}");
        }
        Ok(())
    }
}
