//! Lock-guarded screen handle
//!
//! One writer (the thread feeding PTY bytes through the parser) and any
//! number of readers (UI redraw) share a screen through `SharedScreen`.
//! Every query takes the lock for its own duration, so readers never see a
//! torn write. Queries return owned values rather than references into the
//! grid.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::cell::Cell;
use super::line::Line;
use super::screen::Screen;
use super::snapshot::Snapshot;

/// Cloneable handle to a screen behind a mutex
#[derive(Debug, Clone)]
pub struct SharedScreen {
    inner: Arc<Mutex<Screen>>,
}

impl SharedScreen {
    pub fn new(screen: Screen) -> Self {
        Self {
            inner: Arc::new(Mutex::new(screen)),
        }
    }

    /// Lock the screen for a batch of reads or writes
    pub fn lock(&self) -> MutexGuard<'_, Screen> {
        self.inner.lock()
    }

    /// Copy of the cell at `(x, y)`, `None` when out of range
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.inner.lock().cell(x, y).copied()
    }

    /// Copy of row `y`, `None` when out of range
    pub fn line(&self, y: usize) -> Option<Line> {
        self.inner.lock().line(y).cloned()
    }

    pub fn get_text_range(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> String {
        self.inner.lock().get_text_range(x0, y0, x1, y1)
    }

    pub fn width(&self) -> usize {
        self.inner.lock().width()
    }

    pub fn height(&self) -> usize {
        self.inner.lock().height()
    }

    /// Width and height read under a single lock
    pub fn size(&self) -> (usize, usize) {
        let screen = self.inner.lock();
        (screen.width(), screen.height())
    }

    pub fn cursor_pos(&self) -> (usize, usize) {
        self.inner.lock().cursor_pos()
    }

    pub fn cursor_visible(&self) -> bool {
        self.inner.lock().cursor_visible()
    }

    /// Text of the whole visible screen
    pub fn contents(&self) -> String {
        self.inner.lock().contents()
    }

    /// Joined text of the history
    pub fn history_text(&self) -> String {
        self.inner.lock().history().get_text()
    }

    pub fn resize(&self, cols: usize, rows: usize) {
        self.inner.lock().resize(cols, rows);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.inner.lock())
    }
}
