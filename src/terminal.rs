//! Terminal
//!
//! Ties together the parser, the performer, and the screen. This is the
//! entry point for an orchestrator: feed it PTY bytes with
//! [`Terminal::parse`], read the grid through [`Terminal::screen`], and
//! register callbacks for host-facing events.

use tracing::trace;

use crate::config::TerminalConfig;
use crate::core::{Screen, SharedScreen, Snapshot};
use crate::parser::Parser;
use crate::performer::{Event, Performer};

type TitleCallback = Box<dyn FnMut(&str) + Send>;
type OscCallback = Box<dyn FnMut(u16, &str) + Send>;
type UnknownCallback = Box<dyn FnMut(&[u8]) + Send>;

/// A terminal session: parser state plus a shared screen
pub struct Terminal {
    parser: Parser,
    performer: Performer,
    screen: SharedScreen,
    title: String,
    working_directory: Option<String>,
    on_title_change: Option<TitleCallback>,
    on_osc: Option<OscCallback>,
    on_unknown_sequence: Option<UnknownCallback>,
}

impl Terminal {
    /// Create a terminal with the given dimensions and default settings
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_config(&TerminalConfig {
            cols,
            rows,
            ..TerminalConfig::default()
        })
    }

    pub fn with_config(config: &TerminalConfig) -> Self {
        let screen = Screen::with_tab_width(
            config.cols,
            config.rows,
            config.history_capacity,
            config.tab_width,
        );
        Self {
            parser: Parser::new(),
            performer: Performer::new(),
            screen: SharedScreen::new(screen),
            title: String::new(),
            working_directory: None,
            on_title_change: None,
            on_osc: None,
            on_unknown_sequence: None,
        }
    }

    /// Handle to the screen, for readers on other threads
    pub fn screen(&self) -> SharedScreen {
        self.screen.clone()
    }

    /// Process a chunk of bytes from the PTY.
    ///
    /// The screen lock is held for the whole chunk. Callbacks run after it
    /// is released, in the order their sequences appeared.
    pub fn parse(&mut self, data: &[u8]) {
        {
            let mut screen = self.screen.lock();
            let performer = &mut self.performer;
            self.parser
                .parse(data, |action| performer.perform(&mut screen, action));
        }
        trace!(len = data.len(), "parsed chunk");

        for event in self.performer.take_events() {
            self.dispatch(event);
        }
    }

    pub fn parse_str(&mut self, text: &str) {
        self.parse(text.as_bytes());
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::TitleChanged(title) => {
                if let Some(callback) = self.on_title_change.as_mut() {
                    callback(&title);
                }
                self.title = title;
            }
            Event::Osc { command, payload } => {
                if command == 7 {
                    self.working_directory = Some(payload.clone());
                }
                if let Some(callback) = self.on_osc.as_mut() {
                    callback(command, &payload);
                }
            }
            Event::Unknown(raw) => {
                if let Some(callback) = self.on_unknown_sequence.as_mut() {
                    callback(&raw);
                }
            }
        }
    }

    /// Called with the new title on OSC 0 and OSC 2
    pub fn on_title_change<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_title_change = Some(Box::new(callback));
    }

    /// Called with `(id, payload)` for every OSC command other than 0 and 2
    pub fn on_osc<F>(&mut self, callback: F)
    where
        F: FnMut(u16, &str) + Send + 'static,
    {
        self.on_osc = Some(Box::new(callback));
    }

    /// Called with the raw bytes of each malformed or unsupported sequence
    pub fn on_unknown_sequence<F>(&mut self, callback: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.on_unknown_sequence = Some(Box::new(callback));
    }

    /// Last title set by OSC 0/2
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Last location reported by OSC 7
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Resize the screen. Mirroring the size to the PTY is the caller's job.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.screen.resize(cols, rows);
    }

    /// Full reset: screen, parser state, title and working directory
    pub fn reset(&mut self) {
        self.parser.reset();
        self.screen.lock().reset();
        self.title.clear();
        self.working_directory = None;
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.screen.snapshot();
        snapshot.title = self.title.clone();
        snapshot
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("parser", &self.parser)
            .field("screen", &self.screen)
            .field("title", &self.title)
            .field("working_directory", &self.working_directory)
            .finish_non_exhaustive()
    }
}
