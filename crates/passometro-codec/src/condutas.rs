//! Fixed grid layout for the Condutas / Pendências field.
//!
//! Lines are packed four to a column into three columns, in order. This is a fixed-capacity
//! layout: the thirteenth line onward is not placed. The number of lines left out is kept in
//! [`DirectiveGrid::hidden`] so renderers can show that something is missing.

use serde::Serialize;

pub const COLUMN_COUNT: usize = 3;
pub const ROWS_PER_COLUMN: usize = 4;
pub const CAPACITY: usize = COLUMN_COUNT * ROWS_PER_COLUMN;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DirectiveGrid {
    pub columns: [Vec<String>; COLUMN_COUNT],
    pub hidden: usize,
}

impl DirectiveGrid {
    /// Columns that hold at least one line, left to right.
    pub fn visible_columns(&self) -> impl Iterator<Item = &[String]> {
        self.columns
            .iter()
            .filter(|column| !column.is_empty())
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }
}

/// Splits on newline or `|`, trims, drops blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\n', '|'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn layout(text: &str) -> DirectiveGrid {
    let mut grid = DirectiveGrid::default();
    for (i, line) in split_lines(text).into_iter().enumerate() {
        match grid.columns.get_mut(i / ROWS_PER_COLUMN) {
            Some(column) => column.push(line),
            None => grid.hidden += 1,
        }
    }
    grid
}
