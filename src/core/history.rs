//! Scrollback history
//!
//! Stores lines that have scrolled off the top of the screen. Bounded FIFO:
//! once full, pushing a new line evicts the oldest one.

use std::collections::VecDeque;

use super::line::Line;

/// Bounded FIFO of line snapshots
#[derive(Debug, Clone)]
pub struct History {
    lines: VecDeque<Line>,
    capacity: usize,
}

impl History {
    /// Create a new history with the given capacity.
    /// A capacity of 0 disables history (pushes are dropped).
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate too much
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a copy of `line`. The live screen line keeps mutating, so the
    /// history owns its own cells.
    pub fn add(&mut self, line: &Line) {
        self.push(line.clone());
    }

    /// Append an owned line, evicting the oldest when full
    pub fn push(&mut self, line: Line) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Get a line by index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Get a line by index from the end (0 = most recent)
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        let len = self.lines.len();
        if index >= len {
            return None;
        }
        self.lines.get(len - 1 - index)
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> + ExactSizeIterator + '_ {
        self.lines.iter()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Concatenate the retained lines into text.
    ///
    /// Lines are joined with `\n`, except that a line marked wrapped flows
    /// directly into its continuation. Trailing blanks are trimmed only at
    /// hard line ends.
    pub fn get_text(&self) -> String {
        let mut text = String::new();
        let mut iter = self.lines.iter().peekable();
        while let Some(line) = iter.next() {
            if line.is_wrapped() {
                text.push_str(&line.text_range(0, line.cols()));
            } else {
                text.push_str(&line.text());
                if iter.peek().is_some() {
                    text.push('\n');
                }
            }
        }
        text
    }
}
