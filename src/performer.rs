//! Terminal Performer
//!
//! Applies parsed terminal actions to the screen model.
//! This is the bridge between the parser and the screen.
//!
//! Sequences that concern the host rather than the grid (title changes,
//! other OSC commands, unknown sequences) are queued as [`Event`]s so the
//! owner can deliver them after releasing the screen lock.

use tracing::{debug, trace};

use crate::core::{CellAttributes, Color, CursorStyle, EraseMode, Screen};
use crate::parser::{c0, Action, CsiAction, Params};

/// Longest raw sequence copied into an [`Event::Unknown`]
const MAX_REPORTED_LEN: usize = 64;

/// Host-facing notification produced while applying actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// OSC 0 or OSC 2
    TitleChanged(String),
    /// Any other OSC command
    Osc { command: u16, payload: String },
    /// Malformed or unsupported sequence, raw bytes
    Unknown(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct Performer {
    events: Vec<Event>,
}

impl Performer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the events queued since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn perform(&mut self, screen: &mut Screen, action: Action) {
        match action {
            Action::Print(c) => screen.write_rune(c),
            Action::Execute(byte) => self.execute(screen, byte),
            Action::CsiDispatch(csi) => self.csi_dispatch(screen, &csi),
            Action::EscDispatch {
                intermediates,
                final_byte,
            } => self.esc_dispatch(screen, &intermediates, final_byte),
            Action::OscDispatch { command, payload } => self.osc_dispatch(command, payload),
            Action::DcsDispatch(data) => {
                debug!(len = data.len(), "DCS sequence (not implemented)");
                let mut raw = vec![c0::ESC, b'P'];
                raw.extend(data.into_iter().take(MAX_REPORTED_LEN));
                self.unknown(raw);
            }
            Action::Unknown(raw) => self.unknown(raw),
        }
    }

    fn unknown(&mut self, raw: Vec<u8>) {
        debug!(sequence = ?String::from_utf8_lossy(&raw), "unknown sequence");
        self.events.push(Event::Unknown(raw));
    }

    fn execute(&self, screen: &mut Screen, byte: u8) {
        match byte {
            // No audible bell in a headless core
            c0::BEL => trace!("bell"),
            c0::BS => screen.backspace(),
            c0::HT => screen.tab(),
            c0::LF | c0::VT | c0::FF => screen.line_feed(),
            c0::CR => screen.carriage_return(),
            c0::SO => debug!("Shift Out (G1 charset) - not implemented"),
            c0::SI => debug!("Shift In (G0 charset) - not implemented"),
            _ => trace!("Unhandled control character: 0x{:02X}", byte),
        }
    }

    fn csi_dispatch(&mut self, screen: &mut Screen, csi: &CsiAction) {
        match (csi.marker, csi.intermediates.as_slice(), csi.final_byte) {
            (None, [], _) => self.csi_standard(screen, csi),
            (Some(b'?'), [], b'h' | b'l') => {
                self.private_mode(screen, &csi.params, csi.final_byte == b'h')
            }
            (None, [b' '], b'q') => match CursorStyle::from_param(csi.params.raw(0)) {
                Some(style) => screen.set_cursor_style(style),
                None => debug!("DECSCUSR: unknown cursor style {}", csi.params.raw(0)),
            },
            (Some(b'!'), [], b'p') | (None, [b'!'], b'p') => screen.soft_reset(),
            // Queries: there is no reply channel in this core
            (Some(b'?'), [], b'n') | (Some(b'>' | b'='), [], b'c') => {
                debug!("device query {:?} ignored", String::from_utf8_lossy(&csi.to_bytes()));
            }
            _ => self.unknown(csi.to_bytes()),
        }
    }

    fn csi_standard(&mut self, screen: &mut Screen, csi: &CsiAction) {
        let n = csi.param(0, 1) as usize;
        match csi.final_byte {
            b'A' => screen.move_cursor_up(n),
            b'B' => screen.move_cursor_down(n),
            b'C' => screen.move_cursor_forward(n),
            b'D' => screen.move_cursor_backward(n),
            b'E' => {
                screen.move_cursor_down(n);
                screen.carriage_return();
            }
            b'F' => {
                screen.move_cursor_up(n);
                screen.carriage_return();
            }
            b'G' | b'`' => screen.set_cursor_col(n - 1),
            b'H' | b'f' => {
                let row = csi.param(0, 1) as usize;
                let col = csi.param(1, 1) as usize;
                screen.move_cursor_to(col - 1, row - 1);
            }
            b'd' => screen.set_cursor_row(n - 1),
            b'a' => screen.move_cursor_forward(n),
            b'e' => screen.move_cursor_down(n),
            b'I' => screen.tab_forward(n),
            b'Z' => screen.tab_backward(n),
            b'J' => match EraseMode::from_param(csi.params.raw(0)) {
                Some(mode) => screen.erase_in_display(mode),
                None => debug!("ED: unknown mode {}", csi.params.raw(0)),
            },
            b'K' => match EraseMode::from_param(csi.params.raw(0)) {
                Some(mode) if mode != EraseMode::History => screen.erase_in_line(mode),
                _ => debug!("EL: unknown mode {}", csi.params.raw(0)),
            },
            b'L' => screen.insert_lines(n),
            b'M' => screen.delete_lines(n),
            b'P' => screen.delete_chars(n),
            b'@' => screen.insert_chars(n),
            b'X' => screen.erase_chars(n),
            b'S' => screen.scroll_up(n),
            b'T' => screen.scroll_down(n),
            b'b' => screen.repeat_last(n),
            b'g' => match csi.params.raw(0) {
                0 => screen.clear_tab_stop(),
                3 => screen.clear_all_tab_stops(),
                mode => debug!("TBC: unknown mode {}", mode),
            },
            b'h' | b'l' => {
                for mode in csi.params.iter() {
                    debug!("ANSI mode {} set={} - not implemented", mode, csi.final_byte == b'h');
                }
            }
            b'm' => self.sgr(screen, &csi.params),
            b'n' => debug!("DSR {} ignored", csi.params.raw(0)),
            b'c' => debug!("DA ignored"),
            b't' => debug!("window operation {} ignored", csi.params.raw(0)),
            b'r' => {
                let top = csi.param(0, 1) as usize;
                let bottom = csi.param(1, screen.height().min(u16::MAX as usize) as u16) as usize;
                screen.set_scroll_region(top - 1, bottom - 1);
            }
            b's' => screen.save_cursor(),
            b'u' => screen.restore_cursor(),
            _ => self.unknown(csi.to_bytes()),
        }
    }

    fn private_mode(&self, screen: &mut Screen, params: &Params, enable: bool) {
        for mode in params.iter() {
            match mode {
                6 => screen.set_origin_mode(enable),
                7 => screen.set_auto_wrap(enable),
                25 => screen.set_cursor_visible(enable),
                1 => debug!("DECCKM (cursor keys mode): {} - not implemented", enable),
                12 => debug!("cursor blink: {} - not implemented", enable),
                47 | 1047 | 1049 => {
                    debug!("alternate screen {}: {} - not implemented", mode, enable)
                }
                1000..=1006 | 1015 => debug!("mouse mode {}: {} - not implemented", mode, enable),
                2004 => debug!("bracketed paste: {} - not implemented", enable),
                2026 => debug!("synchronized update: {} - not implemented", enable),
                _ => debug!("Unknown private mode {}: {}", mode, enable),
            }
        }
    }

    fn sgr(&self, screen: &mut Screen, params: &Params) {
        let groups = params;
        let params = params.as_slice();
        if params.is_empty() {
            screen.reset_attributes();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let param = params[i];
            match param {
                0 => screen.reset_attributes(),
                1 => screen.set_attribute(CellAttributes::BOLD),
                2 => screen.set_attribute(CellAttributes::DIM),
                3 => screen.set_attribute(CellAttributes::ITALIC),
                4 => match groups.subparams(i) {
                    [0, ..] => screen.clear_attribute(CellAttributes::UNDERLINE),
                    _ => screen.set_attribute(CellAttributes::UNDERLINE),
                },
                5 | 6 => screen.set_attribute(CellAttributes::BLINK),
                7 => screen.set_attribute(CellAttributes::REVERSE),
                8 => screen.set_attribute(CellAttributes::HIDDEN),
                9 => screen.set_attribute(CellAttributes::STRIKE),

                21 => screen.clear_attribute(CellAttributes::BOLD),
                22 => screen.clear_attribute(CellAttributes::BOLD | CellAttributes::DIM),
                23 => screen.clear_attribute(CellAttributes::ITALIC),
                24 => screen.clear_attribute(CellAttributes::UNDERLINE),
                25 => screen.clear_attribute(CellAttributes::BLINK),
                27 => screen.clear_attribute(CellAttributes::REVERSE),
                28 => screen.clear_attribute(CellAttributes::HIDDEN),
                29 => screen.clear_attribute(CellAttributes::STRIKE),

                30..=37 => screen.set_foreground(Color::Indexed((param - 30) as u8)),
                38 => {
                    let subs = groups.subparams(i);
                    let (color, used) = if subs.is_empty() {
                        extended_color(&params[i + 1..])
                    } else {
                        (colon_color(subs), 0)
                    };
                    if let Some(color) = color {
                        screen.set_foreground(color);
                    }
                    i += used;
                }
                39 => screen.set_foreground(Color::Default),

                40..=47 => screen.set_background(Color::Indexed((param - 40) as u8)),
                48 => {
                    let subs = groups.subparams(i);
                    let (color, used) = if subs.is_empty() {
                        extended_color(&params[i + 1..])
                    } else {
                        (colon_color(subs), 0)
                    };
                    if let Some(color) = color {
                        screen.set_background(color);
                    }
                    i += used;
                }
                49 => screen.set_background(Color::Default),

                90..=97 => screen.set_foreground(Color::Indexed((param - 90 + 8) as u8)),
                100..=107 => screen.set_background(Color::Indexed((param - 100 + 8) as u8)),

                _ => trace!("Unknown SGR parameter: {}", param),
            }
            i += 1;
        }
    }

    fn esc_dispatch(&mut self, screen: &mut Screen, intermediates: &[u8], final_byte: u8) {
        match (intermediates, final_byte) {
            ([], b'7') => screen.save_cursor(),
            ([], b'8') => screen.restore_cursor(),
            ([], b'D') => screen.line_feed(),
            ([], b'E') => screen.next_line(),
            ([], b'M') => screen.reverse_line_feed(),
            ([], b'H') => screen.set_tab_stop(),
            ([], b'c') => screen.reset(),
            ([], b'=' | b'>') => debug!("keypad mode {} - not implemented", final_byte as char),
            ([b'#'], b'8') => screen.alignment_test(),
            ([b'(' | b')' | b'*' | b'+'], _) => {
                debug!("charset designation {} - not implemented", final_byte as char)
            }
            _ => {
                let mut raw = vec![c0::ESC];
                raw.extend_from_slice(intermediates);
                raw.push(final_byte);
                self.unknown(raw);
            }
        }
    }

    fn osc_dispatch(&mut self, command: u16, payload: String) {
        trace!(command, "OSC");
        match command {
            0 | 2 => self.events.push(Event::TitleChanged(payload)),
            _ => self.events.push(Event::Osc { command, payload }),
        }
    }
}

/// Decode the tail of an SGR 38/48 sequence: `5;n` or `2;r;g;b`.
///
/// Returns the color, if complete, and the number of parameters consumed.
/// Never consumes past the end of `rest`.
fn extended_color(rest: &[u16]) -> (Option<Color>, usize) {
    let clamp = |v: u16| v.min(255) as u8;
    match rest {
        [5, n, ..] => (Some(Color::Indexed(clamp(*n))), 2),
        [2, r, g, b, ..] => (Some(Color::Rgb(clamp(*r), clamp(*g), clamp(*b))), 4),
        [2, tail @ ..] => (None, 1 + tail.len()),
        [_, ..] => (None, 1),
        [] => (None, 0),
    }
}

/// Decode the colon form of an extended colour, `38:5:n` or `38:2:[cs]:r:g:b`
fn colon_color(subs: &[u16]) -> Option<Color> {
    let clamp = |v: u16| v.min(255) as u8;
    match subs {
        [5, n, ..] => Some(Color::Indexed(clamp(*n))),
        // Colour-space id in the first slot, usually left empty
        [2, _, r, g, b, ..] => Some(Color::Rgb(clamp(*r), clamp(*g), clamp(*b))),
        [2, r, g, b] => Some(Color::Rgb(clamp(*r), clamp(*g), clamp(*b))),
        _ => None,
    }
}
