// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

/// A plain-text table, one row per element of `data`.
pub struct Table<'a, T, C: TableColumn<T>> {
    columns: &'a [C],
    data: &'a [T],
    separator: &'a str,
    header: bool,
}

impl<'a, T, C: TableColumn<T>> Table<'a, T, C> {
    pub fn new(columns: &'a [C], data: &'a [T]) -> Self {
        Self {
            columns,
            data,
            separator: "  ",
            header: true,
        }
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    fn widths(&self, rows: &[Vec<Cow<'_, str>>]) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| if self.header { c.name().width() } else { 0 })
            .collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        widths
    }

    fn write_row<'c>(
        &self,
        f: &mut fmt::Formatter<'_>,
        widths: &[usize],
        cells: impl Iterator<Item = (Cow<'c, str>, Option<Color>)>,
    ) -> fmt::Result {
        let last = self.columns.len().saturating_sub(1);
        for (i, ((cell, color), col)) in cells.zip(self.columns).enumerate() {
            // The last left-aligned column needs no padding.
            let padded = match col.padding_direction() {
                PaddingDirection::Left if i == last => cell.into_owned(),
                PaddingDirection::Left => pad(&cell, widths[i], false),
                PaddingDirection::Right => pad(&cell, widths[i], true),
            };
            match color {
                Some(color) => write!(f, "{}", padded.as_str().color(color))?,
                None => write!(f, "{padded}")?,
            }
            if i < last {
                write!(f, "{}", self.separator)?;
            }
        }
        writeln!(f)
    }
}

impl<T, C: TableColumn<T>> fmt::Display for Table<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<Cow<'_, str>>> = self
            .data
            .iter()
            .map(|data| self.columns.iter().map(|c| c.format(data)).collect())
            .collect();
        let widths = self.widths(&rows);

        if self.header {
            let names = self.columns.iter().map(|c| (c.name(), None));
            self.write_row(f, &widths, names)?;
        }
        for (row, data) in rows.into_iter().zip(self.data) {
            let colors = self.columns.iter().map(|c| c.get_color(data));
            self.write_row(f, &widths, row.into_iter().zip(colors))?;
        }
        Ok(())
    }
}

fn pad(cell: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    if right {
        format!("{fill}{cell}")
    } else {
        format!("{cell}{fill}")
    }
}

pub trait TableColumn<T> {
    fn name(&self) -> Cow<'_, str>;

    fn format<'a>(&self, data: &'a T) -> Cow<'a, str>;

    fn padding_direction(&self) -> PaddingDirection {
        PaddingDirection::Left
    }

    fn get_color(&self, _data: &T) -> Option<Color> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}
