// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use taskbridge_core::{FailedOperation, Operation, SkippedRecord, SyncReport};

use crate::table::{Table, TableColumn};
use crate::util::{OutputFormat, plural};

#[derive(Debug)]
pub struct ReportFormatter {
    columns: Vec<ReportColumn>,
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            columns: vec![
                ReportColumn::Status,
                ReportColumn::Action,
                ReportColumn::Target,
                ReportColumn::Name,
                ReportColumn::Detail,
            ],
            format,
        }
    }

    pub fn format<'a>(&'a self, report: &'a SyncReport) -> Display<'a> {
        Display {
            report,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    report: &'a SyncReport,
    formatter: &'a ReportFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatter.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(self.report).map_err(|_| fmt::Error)?;
                writeln!(f, "{json}")
            }
            OutputFormat::Table => self.fmt_table(f),
        }
    }
}

impl Display<'_> {
    fn fmt_table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let rows: Vec<ReportRow<'_>> = report
            .succeeded
            .iter()
            .map(ReportRow::Succeeded)
            .chain(report.failed.iter().map(ReportRow::Failed))
            .chain(report.skipped.iter().map(ReportRow::Skipped))
            .collect();

        if rows.is_empty() {
            return writeln!(f, "{}", "Everything is up to date".italic());
        }

        write!(f, "{}", Table::new(&self.formatter.columns, &rows))?;
        writeln!(f)?;

        let verb = if report.dry_run {
            "Would apply"
        } else {
            "Applied"
        };
        write!(f, "{} {}", verb, plural(report.succeeded.len(), "operation"))?;
        if !report.failed.is_empty() {
            let failed = format!("{} failed", report.failed.len());
            write!(f, ", {}", failed.red())?;
        }
        if !report.skipped.is_empty() {
            let skipped = format!("{} skipped", plural(report.skipped.len(), "record"));
            write!(f, ", {}", skipped.yellow())?;
        }
        writeln!(f)
    }
}

#[derive(Debug, Clone, Copy)]
enum ReportRow<'a> {
    Succeeded(&'a Operation),
    Failed(&'a FailedOperation),
    Skipped(&'a SkippedRecord),
}

#[derive(Debug, Clone, Copy)]
enum ReportColumn {
    Status,
    Action,
    Target,
    Name,
    Detail,
}

impl<'r> TableColumn<ReportRow<'r>> for ReportColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Status => "STATUS",
            Self::Action => "ACTION",
            Self::Target => "TARGET",
            Self::Name => "NAME",
            Self::Detail => "DETAIL",
        }
        .into()
    }

    fn format<'a>(&self, row: &'a ReportRow<'r>) -> Cow<'a, str> {
        match (self, row) {
            (Self::Status, ReportRow::Succeeded(_)) => "ok".into(),
            (Self::Status, ReportRow::Failed(_)) => "failed".into(),
            (Self::Status, ReportRow::Skipped(_)) => "skipped".into(),

            (Self::Action, ReportRow::Succeeded(op)) => op.action.to_string().into(),
            (Self::Action, ReportRow::Failed(failed)) => failed.operation.action.to_string().into(),
            (Self::Action, ReportRow::Skipped(_)) => "-".into(),

            (Self::Target, ReportRow::Succeeded(op)) => op.target.to_string().into(),
            (Self::Target, ReportRow::Failed(failed)) => failed.operation.target.to_string().into(),
            (Self::Target, ReportRow::Skipped(skipped)) => format!("{} record", skipped.store).into(),

            (Self::Name, ReportRow::Succeeded(op)) => op.name.as_str().into(),
            (Self::Name, ReportRow::Failed(failed)) => failed.operation.name.as_str().into(),
            (Self::Name, ReportRow::Skipped(skipped)) => skipped.container.as_str().into(),

            (Self::Detail, ReportRow::Succeeded(_)) => "".into(),
            (Self::Detail, ReportRow::Failed(failed)) => failed.reason.as_str().into(),
            (Self::Detail, ReportRow::Skipped(skipped)) => skipped.reason.as_str().into(),
        }
    }

    fn get_color(&self, row: &ReportRow<'r>) -> Option<Color> {
        match (self, row) {
            (Self::Status, ReportRow::Succeeded(_)) => Some(Color::Green),
            (Self::Status, ReportRow::Failed(_)) => Some(Color::Red),
            (Self::Status, ReportRow::Skipped(_)) => Some(Color::Yellow),
            _ => None,
        }
    }
}
