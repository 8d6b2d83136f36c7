//! Cursor state management
//!
//! The cursor tracks position, visibility, and style, along with the pen
//! (colors and attributes) applied to newly written characters. It also
//! supports save/restore operations (DECSC/DECRC and CSI s/u).

use serde::{Deserialize, Serialize};

use super::cell::{CellAttributes, Color};

/// Cursor shape as selected by DECSCUSR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorStyle {
    #[default]
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    BlinkingBar,
    SteadyBar,
}

impl CursorStyle {
    /// Map a DECSCUSR parameter to a style; unknown values yield `None`
    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 | 1 => Some(CursorStyle::BlinkingBlock),
            2 => Some(CursorStyle::SteadyBlock),
            3 => Some(CursorStyle::BlinkingUnderline),
            4 => Some(CursorStyle::SteadyUnderline),
            5 => Some(CursorStyle::BlinkingBar),
            6 => Some(CursorStyle::SteadyBar),
            _ => None,
        }
    }

    pub fn is_blinking(self) -> bool {
        matches!(
            self,
            CursorStyle::BlinkingBlock | CursorStyle::BlinkingUnderline | CursorStyle::BlinkingBar
        )
    }
}

/// Colors and attributes applied to characters as they are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttributes,
}

impl Pen {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Whether the cursor is visible (DECTCEM)
    pub visible: bool,
    /// Cursor shape
    pub style: CursorStyle,
    /// Current write attributes
    pub pen: Pen,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            visible: true,
            style: CursorStyle::default(),
            pen: Pen::default(),
        }
    }
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub pen: Pen,
    pub origin_mode: bool,
    pub auto_wrap: bool,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            pen: Pen::default(),
            origin_mode: false,
            auto_wrap: true,
        }
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset cursor to its power-on state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move cursor up by n rows, stopping at `top`.
    /// A cursor already above `top` stops at row 0 instead.
    pub fn move_up(&mut self, n: usize, top: usize) {
        let limit = if self.row >= top { top } else { 0 };
        self.row = self.row.saturating_sub(n).max(limit);
    }

    /// Move cursor down by n rows, stopping at `bottom`.
    /// A cursor already below `bottom` stops at the last row instead.
    pub fn move_down(&mut self, n: usize, bottom: usize, rows: usize) {
        let limit = if self.row <= bottom {
            bottom
        } else {
            rows.saturating_sub(1)
        };
        self.row = self.row.saturating_add(n).min(limit);
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Capture position and pen for DECSC
    pub fn save(&self, origin_mode: bool, auto_wrap: bool) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            pen: self.pen,
            origin_mode,
            auto_wrap,
        }
    }

    /// Restore position and pen from a DECSC snapshot, clamped to the grid
    pub fn restore(&mut self, saved: &SavedCursor, cols: usize, rows: usize) {
        self.col = saved.col.min(cols.saturating_sub(1));
        self.row = saved.row.min(rows.saturating_sub(1));
        self.pen = saved.pen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::new();
        assert_eq!((cursor.col, cursor.row), (0, 0));
        assert!(cursor.visible);
        assert_eq!(cursor.style, CursorStyle::BlinkingBlock);
    }

    #[test]
    fn test_cursor_move_up_stops_at_top() {
        let mut cursor = Cursor::new();
        cursor.row = 5;
        cursor.move_up(10, 2);
        assert_eq!(cursor.row, 2);

        // Above the region the limit is row 0
        cursor.row = 1;
        cursor.move_up(10, 2);
        assert_eq!(cursor.row, 0);
    }

    #[test]
    fn test_cursor_move_down_stops_at_bottom() {
        let mut cursor = Cursor::new();
        cursor.row = 5;
        cursor.move_down(10, 8, 24);
        assert_eq!(cursor.row, 8);

        cursor.row = 10;
        cursor.move_down(100, 8, 24);
        assert_eq!(cursor.row, 23);
    }

    #[test]
    fn test_cursor_move_horizontal() {
        let mut cursor = Cursor::new();
        cursor.move_right(100, 80);
        assert_eq!(cursor.col, 79);
        cursor.move_left(200);
        assert_eq!(cursor.col, 0);
    }

    #[test]
    fn test_cursor_save_restore_clamps() {
        let mut cursor = Cursor::new();
        cursor.col = 70;
        cursor.row = 20;
        cursor.pen.attrs = CellAttributes::BOLD;
        let saved = cursor.save(false, true);

        cursor.reset();
        cursor.restore(&saved, 40, 12);
        assert_eq!((cursor.col, cursor.row), (39, 11));
        assert_eq!(cursor.pen.attrs, CellAttributes::BOLD);
    }

    #[test]
    fn test_cursor_style_from_param() {
        assert_eq!(CursorStyle::from_param(0), Some(CursorStyle::BlinkingBlock));
        assert_eq!(CursorStyle::from_param(6), Some(CursorStyle::SteadyBar));
        assert_eq!(CursorStyle::from_param(7), None);
        assert!(!CursorStyle::SteadyUnderline.is_blinking());
    }
}
