//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing and debugging. Given the same byte stream, the terminal
//! must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellAttributes, Color};
use super::cursor::Cursor;
use super::screen::{Modes, Screen};

/// A complete snapshot of the screen state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Soft-wrap flag for each row
    pub wrapped: Vec<bool>,
    pub cursor: CursorSnapshot,
    /// Scroll region, both bounds inclusive
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    pub modes: Modes,
    /// Window title, filled in by the terminal that owns the screen
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Number of lines held in history
    pub history_lines: usize,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub ch: char,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    pub style: StyleSnapshot,
    /// Cell width (0 for continuation, 1 normal, 2 wide)
    pub width: u8,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
    pub shape: String,
    pub blinking: bool,
}

impl From<Color> for ColorSnapshot {
    fn from(color: Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(index) => ColorSnapshot::Indexed { index },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb { r, g, b },
        }
    }
}

impl From<CellAttributes> for StyleSnapshot {
    fn from(attrs: CellAttributes) -> Self {
        StyleSnapshot {
            bold: attrs.contains(CellAttributes::BOLD),
            dim: attrs.contains(CellAttributes::DIM),
            italic: attrs.contains(CellAttributes::ITALIC),
            underline: attrs.contains(CellAttributes::UNDERLINE),
            blink: attrs.contains(CellAttributes::BLINK),
            reverse: attrs.contains(CellAttributes::REVERSE),
            hidden: attrs.contains(CellAttributes::HIDDEN),
            strike: attrs.contains(CellAttributes::STRIKE),
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            ch: cell.ch,
            fg: cell.fg.into(),
            bg: cell.bg.into(),
            style: cell.attrs.into(),
            width: cell.width,
        }
    }
}

impl From<&Cursor> for CursorSnapshot {
    fn from(cursor: &Cursor) -> Self {
        use super::cursor::CursorStyle::*;
        CursorSnapshot {
            col: cursor.col,
            row: cursor.row,
            visible: cursor.visible,
            shape: match cursor.style {
                BlinkingBlock | SteadyBlock => "block".to_string(),
                BlinkingUnderline | SteadyUnderline => "underline".to_string(),
                BlinkingBar | SteadyBar => "bar".to_string(),
            },
            blinking: cursor.style.is_blinking(),
        }
    }
}

impl Snapshot {
    /// Create a snapshot from the current screen state
    pub fn from_screen(screen: &Screen) -> Self {
        let grid = screen
            .lines()
            .iter()
            .map(|line| line.cells().iter().map(CellSnapshot::from).collect())
            .collect();
        let (scroll_top, scroll_bottom) = screen.scroll_region();

        Snapshot {
            cols: screen.width(),
            rows: screen.height(),
            grid,
            wrapped: screen.lines().iter().map(|l| l.is_wrapped()).collect(),
            cursor: CursorSnapshot::from(screen.cursor()),
            scroll_top,
            scroll_bottom,
            modes: screen.modes(),
            title: String::new(),
            history_lines: screen.history().len(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain-text rendering of the grid, trailing blanks and empty rows trimmed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row {
                if cell.width == 0 {
                    continue;
                }
                result.push(cell.ch);
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_screen() {
        let mut screen = Screen::new(10, 3, 100);
        screen.write_rune('H');
        screen.write_rune('i');

        let snapshot = Snapshot::from_screen(&screen);

        assert_eq!(snapshot.cols, 10);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.grid[0][0].ch, 'H');
        assert_eq!(snapshot.grid[0][1].ch, 'i');
        assert_eq!(snapshot.cursor.col, 2);
        assert_eq!(snapshot.cursor.row, 0);
        assert_eq!((snapshot.scroll_top, snapshot.scroll_bottom), (0, 2));
    }

    #[test]
    fn test_snapshot_to_text() {
        let mut screen = Screen::new(10, 3, 100);
        screen.write_rune('A');
        screen.write_rune('B');
        screen.line_feed();
        screen.carriage_return();
        screen.write_rune('C');

        let snapshot = Snapshot::from_screen(&screen);
        assert_eq!(snapshot.to_text(), "AB\nC\n");
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = Screen::new(5, 2, 100);
        screen.write_rune('X');
        screen.set_attribute(CellAttributes::BOLD);
        screen.set_foreground(Color::RED);
        screen.write_rune('Y');

        let snapshot = Snapshot::from_screen(&screen);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(snapshot, restored);
        assert!(restored.grid[0][1].style.bold);
    }

    #[test]
    fn test_color_snapshot() {
        assert_eq!(ColorSnapshot::from(Color::Default), ColorSnapshot::Default);
        assert_eq!(
            ColorSnapshot::from(Color::Indexed(5)),
            ColorSnapshot::Indexed { index: 5 }
        );
        assert_eq!(
            ColorSnapshot::from(Color::Rgb(255, 128, 0)),
            ColorSnapshot::Rgb {
                r: 255,
                g: 128,
                b: 0
            }
        );
    }

    #[test]
    fn test_style_snapshot() {
        let snapshot = StyleSnapshot::from(CellAttributes::BOLD | CellAttributes::UNDERLINE);
        assert!(snapshot.bold);
        assert!(snapshot.underline);
        assert!(!snapshot.italic);
    }
}
