// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use jiff::tz::TimeZone;
use tokio::process::Command;

use crate::container::LocalList;
use crate::error::StoreResult;
use crate::item::{Item, LocalFields, UNIT_SEPARATOR};
use crate::store::LocalStore;

/// Separates records in script output.
pub const RECORD_SEPARATOR: char = '\u{1e}';

const LIST_LISTS: &str = include_str!("reminders/list_lists.applescript");
const LIST_ITEMS: &str = include_str!("reminders/list_items.applescript");
const SAVE_ITEM: &str = include_str!("reminders/save_item.applescript");
const DELETE_ITEM: &str = include_str!("reminders/delete_item.applescript");
const CREATE_LIST: &str = include_str!("reminders/create_list.applescript");
const DELETE_LIST: &str = include_str!("reminders/delete_list.applescript");
const COMPLETED: &str = include_str!("reminders/completed.applescript");

/// [`LocalStore`] for the macOS Reminders app, driven through `osascript`.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
    program: String,
    timezone: TimeZone,
}

impl ScriptBridge {
    pub fn new(timezone: TimeZone) -> Self {
        Self {
            program: "osascript".to_string(),
            timezone,
        }
    }

    /// Runs scripts with another interpreter instead of `osascript`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, script: &str, args: &[&str]) -> StoreResult<String> {
        tracing::trace!(program = %self.program, ?args, "running script");
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("Failed to run {}: {e}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} exited with {}: {}", self.program, output.status, stderr.trim()).into());
        }

        let stdout = String::from_utf8(output.stdout)?;
        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn save(&self, mode: &str, target: &str, item: &Item) -> StoreResult<String> {
        let fields = LocalFields::from_item(item, &self.timezone);
        let args: [&str; 8] = [
            mode,
            target,
            &fields.name,
            &fields.due,
            &fields.all_day,
            &fields.remind,
            &fields.completed,
            &fields.body,
        ];
        self.run(SAVE_ITEM, &args).await
    }
}

/// Script arguments addressing a list by id, or by name if it has none.
fn list_selector(list: &LocalList) -> [&str; 2] {
    match &list.id {
        Some(id) => ["id", id.as_str()],
        None => ["name", list.name.as_str()],
    }
}

fn records(output: &str) -> impl Iterator<Item = &str> {
    output.split(RECORD_SEPARATOR).filter(|r| !r.trim().is_empty())
}

fn parse_list(record: &str) -> StoreResult<LocalList> {
    let (id, name) = record
        .split_once(UNIT_SEPARATOR)
        .ok_or_else(|| format!("Malformed list record: {record:?}"))?;
    Ok(LocalList::new(name).with_id(id))
}

fn parse_count(output: &str) -> StoreResult<usize> {
    output
        .trim()
        .parse()
        .map_err(|e| format!("Unexpected count {output:?}: {e}").into())
}

#[async_trait]
impl LocalStore for ScriptBridge {
    async fn list_lists(&self) -> StoreResult<Vec<LocalList>> {
        let output = self.run(LIST_LISTS, &[]).await?;
        records(&output).map(parse_list).collect()
    }

    async fn list_items(&self, list: &LocalList) -> StoreResult<Vec<String>> {
        let output = self.run(LIST_ITEMS, &list_selector(list)).await?;
        Ok(records(&output).map(str::to_string).collect())
    }

    async fn create_item(&self, list: &LocalList, item: &Item) -> StoreResult<String> {
        let list_id = list
            .id
            .as_deref()
            .ok_or_else(|| format!("list {:?} has no id", list.name))?;
        self.save("create", list_id, item).await
    }

    async fn update_item(&self, item: &Item) -> StoreResult<()> {
        let id = item
            .local_id
            .as_deref()
            .ok_or_else(|| format!("reminder {:?} has no id", item.name))?;
        self.save("update", id, item).await?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> StoreResult<()> {
        self.run(DELETE_ITEM, &[id]).await?;
        Ok(())
    }

    async fn create_list(&self, name: &str) -> StoreResult<LocalList> {
        let output = self.run(CREATE_LIST, &[name]).await?;
        parse_list(&output)
    }

    async fn delete_list(&self, list: &LocalList) -> StoreResult<()> {
        self.run(DELETE_LIST, &list_selector(list)).await?;
        Ok(())
    }

    async fn count_completed(&self) -> StoreResult<usize> {
        parse_count(&self.run(COMPLETED, &["count"]).await?)
    }

    async fn delete_completed(&self) -> StoreResult<usize> {
        parse_count(&self.run(COMPLETED, &["delete"]).await?)
    }
}
