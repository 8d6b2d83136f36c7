//! Terminal line representation
//!
//! A line represents a row of cells in the terminal grid,
//! with metadata about wrapping behavior.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// The cells in this line
    cells: Vec<Cell>,
    /// True if this line overflowed and its text continues on the next line
    wrapped: bool,
}

impl Line {
    /// Create a new blank line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::BLANK; cols],
            wrapped: false,
        }
    }

    /// Create a line from existing cells
    pub fn from_cells(cells: Vec<Cell>, wrapped: bool) -> Self {
        Self { cells, wrapped }
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell at the given column
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get a mutable reference to a cell at the given column
    pub fn cell_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn set_wrapped(&mut self, wrapped: bool) {
        self.wrapped = wrapped;
    }

    /// Resize the line to a new number of columns.
    /// Growing appends blank cells, shrinking truncates from the right.
    pub fn resize(&mut self, cols: usize) {
        self.cells.resize(cols, Cell::BLANK);
        // A wide character cut in half leaves nothing to continue
        if let Some(last) = self.cells.last_mut() {
            if last.width == 2 {
                last.clear();
            }
        }
    }

    /// Clear all cells in the line
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
        self.wrapped = false;
    }

    /// Clear cells in `[start, end)`, clamped to the line length.
    /// A wide character straddling either edge is blanked whole.
    pub fn clear_range(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        if start < end {
            self.split_wide_at(start);
            self.split_wide_at(end);
            self.cells[start..end].fill(Cell::BLANK);
        }
    }

    /// Insert blank cells at the given column, shifting existing cells right.
    /// Cells that shift past the end are lost.
    pub fn insert_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.split_wide_at(col);
        self.split_wide_at(len - count);
        self.cells[col..].rotate_right(count);
        self.cells[col..col + count].fill(Cell::BLANK);
    }

    /// Delete cells at the given column, shifting remaining cells left.
    /// Vacated cells at the end are blank.
    pub fn delete_cells(&mut self, col: usize, count: usize) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        self.split_wide_at(col);
        self.split_wide_at(col + count);
        self.cells[col..].rotate_left(count);
        self.cells[len - count..].fill(Cell::BLANK);
    }

    /// Blank both halves of a wide character whose halves sit at `col - 1`
    /// and `col`, so an edit at `col` can't separate them
    fn split_wide_at(&mut self, col: usize) {
        if col == 0 || col >= self.cells.len() {
            return;
        }
        if self.cells[col].is_wide_continuation() && self.cells[col - 1].width == 2 {
            self.cells[col - 1].clear();
            self.cells[col].clear();
        }
    }

    /// Text of the cells in `[start, end)`, skipping wide-character spacers
    pub fn text_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.cells.len());
        if start >= end {
            return String::new();
        }
        self.cells[start..end]
            .iter()
            .filter(|c| !c.is_wide_continuation())
            .map(|c| c.ch)
            .collect()
    }

    /// Get the text content of this line with trailing spaces trimmed
    pub fn text(&self) -> String {
        let text = self.text_range(0, self.cells.len());
        text.trim_end_matches(' ').to_string()
    }

    /// Check if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}
