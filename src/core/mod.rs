//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Cell, color and line primitives
//! - Cursor state and positioning
//! - Screen buffer with scroll region and every mutation operation
//! - Bounded scrollback history
//! - Lock-guarded screen handle and deterministic snapshots
//!
//! The core is deterministic: given the same sequence of operations, it
//! always produces the same state.

mod cell;
mod cursor;
mod history;
mod line;
mod screen;
mod shared;
mod snapshot;

pub use cell::{Cell, CellAttributes, Color, EncodedColor};
pub use cursor::{Cursor, CursorStyle, Pen, SavedCursor};
pub use history::History;
pub use line::Line;
pub use screen::{EraseMode, Modes, Screen, DEFAULT_TAB_WIDTH};
pub use shared::SharedScreen;
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, Snapshot, StyleSnapshot};
