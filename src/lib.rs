//! VT terminal emulator core
//!
//! Consumes the raw byte stream a program writes to its pseudo-terminal and
//! maintains the screen a physical terminal would display, plus bounded
//! scrollback history.
//!
//! - `core`: cells, lines, cursor, screen buffer, history, snapshots
//! - `parser`: byte-level VT/xterm escape sequence state machine
//! - `performer`: applies parsed actions to a screen
//! - `terminal`: the session type an orchestrator drives
//! - `config`: session configuration
//!
//! ```
//! use vtscreen::Terminal;
//!
//! let mut term = Terminal::new(80, 24);
//! term.parse(b"A\r\nB");
//! let screen = term.screen();
//! assert_eq!(screen.cell(0, 1).map(|c| c.ch), Some('B'));
//! assert_eq!(screen.cursor_pos(), (1, 1));
//! ```

pub mod config;
pub mod core;
pub mod parser;
pub mod performer;
pub mod terminal;

pub use config::{ConfigError, TerminalConfig};
pub use terminal::Terminal;
