//! Screen model implementation
//!
//! The screen represents the visible terminal grid plus state like the
//! cursor, scroll region, tab stops, and mode flags. Lines that scroll off
//! the top of the screen are appended to the [`History`].
//!
//! Every operation clamps or ignores out-of-range input. The byte stream
//! driving the screen may be malformed or hostile, so nothing here returns
//! an error or panics.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use super::cell::{Cell, CellAttributes, Color};
use super::cursor::{Cursor, CursorStyle, Pen, SavedCursor};
use super::history::History;
use super::line::Line;

/// Default spacing of the initial tab stops
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Terminal mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// Origin mode (DECOM): absolute addressing relative to the scroll region
    pub origin: bool,
    /// Autowrap mode (DECAWM): wrap at the end of the line
    pub auto_wrap: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self {
            origin: false,
            auto_wrap: true,
        }
    }
}

/// Extent of an erase operation (ED/EL parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// From the cursor to the end (0)
    ToEnd,
    /// From the beginning to the cursor, inclusive (1)
    ToBeginning,
    /// Everything (2)
    All,
    /// Scrollback history only (3, display erase only)
    History,
}

impl EraseMode {
    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToBeginning),
            2 => Some(EraseMode::All),
            3 => Some(EraseMode::History),
            _ => None,
        }
    }
}

/// The main screen structure
#[derive(Debug, Clone)]
pub struct Screen {
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
    /// Visible grid, one line per row, each exactly `cols` cells wide
    grid: Vec<Line>,
    /// Lines scrolled off the top
    history: History,
    cursor: Cursor,
    /// Saved cursor (DECSC/DECRC)
    saved_cursor: SavedCursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    /// Tab stops, one flag per column
    tab_stops: Vec<bool>,
    tab_width: usize,
    modes: Modes,
    /// Last printed character, for REP
    last_char: Option<char>,
}

impl Screen {
    /// Create a new screen with the given dimensions.
    /// Zero dimensions are raised to 1.
    pub fn new(cols: usize, rows: usize, history_capacity: usize) -> Self {
        Self::with_tab_width(cols, rows, history_capacity, DEFAULT_TAB_WIDTH)
    }

    /// Create a new screen with tab stops every `tab_width` columns
    pub fn with_tab_width(
        cols: usize,
        rows: usize,
        history_capacity: usize,
        tab_width: usize,
    ) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let tab_width = tab_width.max(1);
        Self {
            cols,
            rows,
            grid: (0..rows).map(|_| Line::new(cols)).collect(),
            history: History::new(history_capacity),
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols, tab_width),
            tab_width,
            modes: Modes::default(),
            last_char: None,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.cols
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Cursor position as `(col, row)`
    pub fn cursor_pos(&self) -> (usize, usize) {
        (self.cursor.col, self.cursor.row)
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor.style
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor.style = style;
    }

    pub fn saved_cursor(&self) -> &SavedCursor {
        &self.saved_cursor
    }

    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// Current write attributes
    pub fn pen(&self) -> Pen {
        self.cursor.pen
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Scroll region as `(top, bottom)`, both inclusive
    pub fn scroll_region(&self) -> (usize, usize) {
        self.region()
    }

    /// Scroll region re-validated against the current grid
    fn region(&self) -> (usize, usize) {
        let bottom = self.scroll_bottom.min(self.rows - 1);
        let top = self.scroll_top.min(bottom);
        (top, bottom)
    }

    /// Get a cell at the given position
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|line| line.cell(col))
    }

    /// Overwrite a cell; out-of-range positions are ignored
    pub fn set_cell(&mut self, col: usize, row: usize, cell: Cell) {
        if let Some(slot) = self.grid.get_mut(row).and_then(|line| line.cell_mut(col)) {
            *slot = cell;
        }
    }

    /// Get a line at the given row
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.grid.get(row)
    }

    pub fn lines(&self) -> &[Line] {
        &self.grid
    }

    /// Write a character at the cursor and advance it.
    ///
    /// Reaching the right margin with autowrap on marks the line wrapped and
    /// moves to column 0 of the next line (scrolling if needed). With
    /// autowrap off the cursor stays on the last column and the next write
    /// overwrites it.
    pub fn write_rune(&mut self, ch: char) {
        let width = match UnicodeWidthChar::width(ch) {
            Some(w) if w > 0 => w.min(2),
            // Combining marks and other zero-width characters
            _ => return,
        };
        if width > self.cols {
            return;
        }
        self.last_char = Some(ch);

        // A wide character that doesn't fit on this line
        if self.cursor.col + width > self.cols {
            if self.modes.auto_wrap {
                self.wrap();
            } else {
                self.cursor.col = self.cols - width;
            }
        }

        let col = self.cursor.col;
        let row = self.cursor.row;
        self.clear_wide_fragments(col, row, width);

        let pen = self.cursor.pen;
        self.set_cell(col, row, Cell::with_style(ch, width as u8, pen.fg, pen.bg, pen.attrs));
        if width == 2 {
            self.set_cell(col + 1, row, Cell::with_style(' ', 0, pen.fg, pen.bg, pen.attrs));
        }

        let next = col + width;
        if next < self.cols {
            self.cursor.col = next;
        } else if self.modes.auto_wrap {
            self.wrap();
        } else {
            self.cursor.col = self.cols - 1;
        }
    }

    /// Write `n` more copies of the last printed character (REP)
    pub fn repeat_last(&mut self, n: usize) {
        if let Some(ch) = self.last_char {
            for _ in 0..n.min(self.cols * self.rows) {
                self.write_rune(ch);
            }
        }
    }

    /// Soft-wrap: mark the line as continued, then CR + LF
    fn wrap(&mut self) {
        if let Some(line) = self.grid.get_mut(self.cursor.row) {
            line.set_wrapped(true);
        }
        self.carriage_return();
        self.line_feed();
    }

    /// Blank the other half of any wide character about to be partially
    /// overwritten by a `width`-wide write at `col`
    fn clear_wide_fragments(&mut self, col: usize, row: usize, width: usize) {
        let Some(line) = self.grid.get_mut(row) else {
            return;
        };
        if col > 0 && line.cell(col).is_some_and(Cell::is_wide_continuation) {
            if let Some(head) = line.cell_mut(col - 1).filter(|c| c.width == 2) {
                head.clear();
            }
        }
        let last = col + width - 1;
        if line.cell(last).is_some_and(|c| c.width == 2) {
            if let Some(tail) = line.cell_mut(last + 1).filter(|c| c.is_wide_continuation()) {
                tail.clear();
            }
        }
    }

    /// Carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    /// Line feed (LF/IND): move down, scrolling at the bottom of the region
    pub fn line_feed(&mut self) {
        let (_, bottom) = self.region();
        if self.cursor.row == bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    /// Reverse line feed (RI): move up, scrolling at the top of the region
    pub fn reverse_line_feed(&mut self) {
        let (top, _) = self.region();
        if self.cursor.row == top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Next line (NEL)
    pub fn next_line(&mut self) {
        self.line_feed();
        self.carriage_return();
    }

    /// Backspace (BS)
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// Horizontal tab (HT): next tab stop, or the last column if none
    pub fn tab(&mut self) {
        self.tab_forward(1);
    }

    /// Cursor forward `n` tab stops (CHT)
    pub fn tab_forward(&mut self, n: usize) {
        for _ in 0..n.max(1) {
            let next = (self.cursor.col + 1..self.cols).find(|&c| self.tab_stops[c]);
            match next {
                Some(col) => self.cursor.col = col,
                None => {
                    self.cursor.col = self.cols - 1;
                    break;
                }
            }
        }
    }

    /// Cursor backward `n` tab stops (CBT)
    pub fn tab_backward(&mut self, n: usize) {
        for _ in 0..n.max(1) {
            let prev = (0..self.cursor.col).rev().find(|&c| self.tab_stops[c]);
            match prev {
                Some(col) => self.cursor.col = col,
                None => {
                    self.cursor.col = 0;
                    break;
                }
            }
        }
    }

    /// Set a tab stop at the current column (HTS)
    pub fn set_tab_stop(&mut self) {
        if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
            *stop = true;
        }
    }

    /// Clear the tab stop at the current column (TBC 0)
    pub fn clear_tab_stop(&mut self) {
        if let Some(stop) = self.tab_stops.get_mut(self.cursor.col) {
            *stop = false;
        }
    }

    /// Clear all tab stops (TBC 3)
    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.fill(false);
    }

    /// Scroll the region up by n lines (content moves up, blank lines at
    /// the bottom). Lines leaving the top of the screen go to history.
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = self.region();
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }

        if top == 0 {
            for line in &self.grid[top..top + n] {
                self.history.add(line);
            }
        }

        self.grid[top..=bottom].rotate_left(n);
        for line in &mut self.grid[bottom + 1 - n..=bottom] {
            line.clear();
        }
    }

    /// Scroll the region down by n lines (content moves down, blank lines at
    /// the top)
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = self.region();
        let n = n.min(bottom - top + 1);
        if n == 0 {
            return;
        }

        self.grid[top..=bottom].rotate_right(n);
        for line in &mut self.grid[top..top + n] {
            line.clear();
        }
    }

    /// Set the scroll region (DECSTBM), 0-indexed and inclusive.
    ///
    /// Requests with `top >= bottom` are ignored and the previous region is
    /// kept. On success the cursor moves to the home position.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.rows - 1);
        if top >= bottom {
            tracing::debug!(top, bottom, "ignoring invalid scroll region");
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.move_cursor_to(0, 0);
    }

    /// Reset the scroll region to the full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows - 1;
    }

    /// Erase in display (ED)
    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let (col, row) = self.cursor_pos();
        match mode {
            EraseMode::ToEnd => {
                self.erase_in_line(EraseMode::ToEnd);
                for line in &mut self.grid[row + 1..] {
                    line.clear();
                }
            }
            EraseMode::ToBeginning => {
                for line in &mut self.grid[..row] {
                    line.clear();
                }
                self.grid[row].clear_range(0, col + 1);
            }
            EraseMode::All => {
                for line in &mut self.grid {
                    line.clear();
                }
            }
            EraseMode::History => {
                self.history.clear();
            }
        }
    }

    /// Erase in line (EL)
    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let (col, row) = self.cursor_pos();
        let cols = self.cols;
        let line = &mut self.grid[row];
        match mode {
            EraseMode::ToEnd => {
                line.clear_range(col, cols);
                line.set_wrapped(false);
            }
            EraseMode::ToBeginning => line.clear_range(0, col + 1),
            EraseMode::All => line.clear(),
            EraseMode::History => {}
        }
    }

    /// Erase characters (ECH): blank n cells from the cursor, no shifting
    pub fn erase_chars(&mut self, n: usize) {
        let (col, row) = self.cursor_pos();
        self.grid[row].clear_range(col, col.saturating_add(n.max(1)));
    }

    /// Insert blank characters (ICH), shifting the rest of the row right
    pub fn insert_chars(&mut self, n: usize) {
        let (col, row) = self.cursor_pos();
        self.grid[row].insert_cells(col, n.max(1));
    }

    /// Delete characters (DCH), shifting the rest of the row left
    pub fn delete_chars(&mut self, n: usize) {
        let (col, row) = self.cursor_pos();
        self.grid[row].delete_cells(col, n.max(1));
    }

    /// Insert lines (IL) at the cursor row, pushing lines down within the
    /// scroll region. No-op when the cursor is outside the region.
    pub fn insert_lines(&mut self, n: usize) {
        let (top, bottom) = self.region();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let n = n.max(1).min(bottom - row + 1);
        self.grid[row..=bottom].rotate_right(n);
        for line in &mut self.grid[row..row + n] {
            line.clear();
        }
    }

    /// Delete lines (DL) at the cursor row, pulling lines up within the
    /// scroll region. No-op when the cursor is outside the region.
    pub fn delete_lines(&mut self, n: usize) {
        let (top, bottom) = self.region();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let n = n.max(1).min(bottom - row + 1);
        self.grid[row..=bottom].rotate_left(n);
        for line in &mut self.grid[bottom + 1 - n..=bottom] {
            line.clear();
        }
    }

    /// Move the cursor to an absolute position (CUP/HVP), 0-indexed.
    /// In origin mode the row is relative to the scroll region top and
    /// confined to the region.
    pub fn move_cursor_to(&mut self, col: usize, row: usize) {
        self.cursor.col = col.min(self.cols - 1);
        self.set_cursor_row(row);
    }

    /// Move the cursor to a column (CHA/HPA)
    pub fn set_cursor_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols - 1);
    }

    /// Move the cursor to a row (VPA), honoring origin mode
    pub fn set_cursor_row(&mut self, row: usize) {
        self.cursor.row = if self.modes.origin {
            let (top, bottom) = self.region();
            top.saturating_add(row).min(bottom)
        } else {
            row.min(self.rows - 1)
        };
    }

    /// Cursor up (CUU)
    pub fn move_cursor_up(&mut self, n: usize) {
        let (top, _) = self.region();
        self.cursor.move_up(n, top);
    }

    /// Cursor down (CUD)
    pub fn move_cursor_down(&mut self, n: usize) {
        let (_, bottom) = self.region();
        self.cursor.move_down(n, bottom, self.rows);
    }

    /// Cursor forward (CUF)
    pub fn move_cursor_forward(&mut self, n: usize) {
        self.cursor.move_right(n, self.cols);
    }

    /// Cursor backward (CUB)
    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    pub fn set_attribute(&mut self, attr: CellAttributes) {
        self.cursor.pen.attrs.insert(attr);
    }

    pub fn clear_attribute(&mut self, attr: CellAttributes) {
        self.cursor.pen.attrs.remove(attr);
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.cursor.pen.fg = color;
    }

    pub fn set_background(&mut self, color: Color) {
        self.cursor.pen.bg = color;
    }

    /// Reset colors and attributes (SGR 0)
    pub fn reset_attributes(&mut self) {
        self.cursor.pen.reset();
    }

    /// Save cursor position, pen and modes (DECSC)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor.save(self.modes.origin, self.modes.auto_wrap);
    }

    /// Restore cursor position, pen and modes (DECRC)
    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor.clone();
        self.cursor.restore(&saved, self.cols, self.rows);
        self.modes.origin = saved.origin_mode;
        self.modes.auto_wrap = saved.auto_wrap;
    }

    /// Origin mode (DECOM). Changing it homes the cursor.
    pub fn set_origin_mode(&mut self, enabled: bool) {
        self.modes.origin = enabled;
        self.move_cursor_to(0, 0);
    }

    /// Autowrap mode (DECAWM)
    pub fn set_auto_wrap(&mut self, enabled: bool) {
        self.modes.auto_wrap = enabled;
    }

    /// Fill the screen with `E` (DECALN)
    pub fn alignment_test(&mut self) {
        for line in &mut self.grid {
            line.clear();
            for cell in line.cells_mut() {
                cell.ch = 'E';
            }
        }
        self.reset_scroll_region();
        self.modes.origin = false;
        self.move_cursor_to(0, 0);
    }

    /// Resize the screen, keeping content anchored at the top-left.
    ///
    /// The cursor, saved cursor, and scroll region are clamped into the new
    /// bounds. A region spanning to the old last row keeps spanning to the
    /// new last row.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.cols && rows == self.rows {
            return;
        }
        tracing::debug!(
            from_cols = self.cols,
            from_rows = self.rows,
            cols,
            rows,
            "resizing screen"
        );

        for line in &mut self.grid {
            line.resize(cols);
        }
        self.grid.resize_with(rows, || Line::new(cols));

        let old_cols = self.cols;
        self.tab_stops.resize(cols, false);
        for col in old_cols..cols {
            self.tab_stops[col] = col % self.tab_width == 0;
        }

        let region_was_full_height = self.scroll_bottom >= self.rows - 1;
        self.cols = cols;
        self.rows = rows;

        self.scroll_bottom = if region_was_full_height {
            rows - 1
        } else {
            self.scroll_bottom.min(rows - 1)
        };
        self.scroll_top = self.scroll_top.min(self.scroll_bottom);
        if self.scroll_top >= self.scroll_bottom {
            self.reset_scroll_region();
        }

        self.cursor.col = self.cursor.col.min(cols - 1);
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.saved_cursor.col = self.saved_cursor.col.min(cols - 1);
        self.saved_cursor.row = self.saved_cursor.row.min(rows - 1);
    }

    /// Full reset (RIS): blank grid, home cursor, default modes, tab stops,
    /// scroll region and pen; history is cleared
    pub fn reset(&mut self) {
        for line in &mut self.grid {
            line.clear();
        }
        self.history.clear();
        self.cursor.reset();
        self.saved_cursor = SavedCursor::default();
        self.reset_scroll_region();
        self.tab_stops = default_tab_stops(self.cols, self.tab_width);
        self.modes = Modes::default();
        self.last_char = None;
    }

    /// Soft reset (DECSTR): like [`Screen::reset`] but keeps the grid,
    /// history, cursor position, and tab stops
    pub fn soft_reset(&mut self) {
        self.cursor.pen.reset();
        self.cursor.visible = true;
        self.saved_cursor = SavedCursor::default();
        self.reset_scroll_region();
        self.modes = Modes::default();
    }

    /// Text between two positions, both inclusive, in reading order.
    ///
    /// Coordinates are clamped to the grid and swapped if reversed. Rows are
    /// joined with `\n` unless the row is soft-wrapped into the next one;
    /// trailing blanks are trimmed where a row ends with a hard newline.
    pub fn get_text_range(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> String {
        let clamp = |x: usize, y: usize| (x.min(self.cols - 1), y.min(self.rows - 1));
        let (mut start, mut end) = (clamp(x0, y0), clamp(x1, y1));
        if (end.1, end.0) < (start.1, start.0) {
            std::mem::swap(&mut start, &mut end);
        }

        let mut text = String::new();
        for row in start.1..=end.1 {
            let line = &self.grid[row];
            let from = if row == start.1 { start.0 } else { 0 };
            let to = if row == end.1 { end.0 + 1 } else { self.cols };
            let segment = line.text_range(from, to);
            let continues = line.is_wrapped() && row < end.1;
            if to == self.cols && !continues {
                text.push_str(segment.trim_end_matches(' '));
            } else {
                text.push_str(&segment);
            }
            if row < end.1 && !continues {
                text.push('\n');
            }
        }
        text
    }

    /// Text of the whole visible screen, one row per line
    pub fn contents(&self) -> String {
        self.grid.iter().map(Line::text).collect::<Vec<_>>().join("\n")
    }
}

/// Tab stops every `tab_width` columns, excluding column 0
fn default_tab_stops(cols: usize, tab_width: usize) -> Vec<bool> {
    (0..cols).map(|c| c > 0 && c % tab_width == 0).collect()
}
