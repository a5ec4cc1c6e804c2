// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, collections::BTreeMap, error::Error};

use clap::{ArgMatches, Command};
use colored::{Color, Colorize};
use taskbridge_core::{DEFAULT_LOCAL_LIST, DEFAULT_REMOTE_CALENDAR, Discovery, SyncEngine};

use crate::arg::CommonArgs;
use crate::table::{Table, TableColumn};
use crate::util::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub struct CmdLists {
    pub output_format: OutputFormat,
}

impl CmdLists {
    pub const NAME: &str = "lists";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show the lists and calendars found on both stores")
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing containers...");
        let discovery = engine.discover().await?;
        let rows = ContainerRow::collect(&discovery, |name| engine.sync_names().contains(name));

        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table if rows.is_empty() => {
                println!("{}", "No lists or calendars found".italic());
            }
            OutputFormat::Table => {
                let columns = [
                    ContainerColumn::Name,
                    ContainerColumn::Local,
                    ContainerColumn::Remote,
                    ContainerColumn::Sync,
                ];
                print!("{}", Table::new(&columns, &rows));
            }
        }
        Ok(())
    }
}

/// A container name and where it exists.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
struct ContainerRow {
    name: String,
    local: bool,
    remote: bool,
    sync: bool,
}

impl ContainerRow {
    /// One row per name; the default list and calendar share a row.
    fn collect(discovery: &Discovery, is_synced: impl Fn(&str) -> bool) -> Vec<Self> {
        let mut names: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
        for list in &discovery.local {
            names.entry(list.name.as_str()).or_default().0 = true;
        }
        for calendar in &discovery.remote {
            names.entry(calendar.name.as_str()).or_default().1 = true;
        }

        let has_default_pair = names.get(DEFAULT_LOCAL_LIST).is_some_and(|(l, _)| *l)
            && names.get(DEFAULT_REMOTE_CALENDAR).is_some_and(|(_, r)| *r);

        let mut rows = Vec::with_capacity(names.len());
        for (name, (local, remote)) in names {
            if has_default_pair && name == DEFAULT_LOCAL_LIST {
                rows.push(Self {
                    name: format!("{DEFAULT_LOCAL_LIST} -> {DEFAULT_REMOTE_CALENDAR}"),
                    local: true,
                    remote: true,
                    sync: is_synced(DEFAULT_LOCAL_LIST) || is_synced(DEFAULT_REMOTE_CALENDAR),
                });
                if !remote {
                    continue;
                }
                // A calendar named like the default list stays unpaired.
                rows.push(Self {
                    name: name.to_string(),
                    local: false,
                    remote: true,
                    sync: false,
                });
                continue;
            }
            if has_default_pair && name == DEFAULT_REMOTE_CALENDAR {
                if local {
                    rows.push(Self {
                        name: name.to_string(),
                        local: true,
                        remote: false,
                        sync: false,
                    });
                }
                continue;
            }
            rows.push(Self {
                name: name.to_string(),
                local,
                remote,
                sync: is_synced(name),
            });
        }
        rows
    }
}

#[derive(Debug, Clone, Copy)]
enum ContainerColumn {
    Name,
    Local,
    Remote,
    Sync,
}

impl TableColumn<ContainerRow> for ContainerColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Name => "NAME",
            Self::Local => "LOCAL",
            Self::Remote => "REMOTE",
            Self::Sync => "SYNC",
        }
        .into()
    }

    fn format<'a>(&self, row: &'a ContainerRow) -> Cow<'a, str> {
        let mark = |flag: bool| if flag { "yes" } else { "-" };
        match self {
            Self::Name => row.name.as_str().into(),
            Self::Local => mark(row.local).into(),
            Self::Remote => mark(row.remote).into(),
            Self::Sync => mark(row.sync).into(),
        }
    }

    fn get_color(&self, row: &ContainerRow) -> Option<Color> {
        match self {
            Self::Sync if row.sync => Some(Color::Green),
            _ => None,
        }
    }
}
