//! Terminal escape sequence parser
//!
//! Implements a state machine parser based on the VT500 series parser model.
//! Reference: <https://vt100.net/emu/dec_ansi_parser>
//!
//! Every byte causes exactly one state transition, and the parser never
//! rejects input: malformed sequences are reported as [`Action::Unknown`]
//! and parsing resumes in the ground state. State persists across calls, so
//! a sequence may be split at any byte boundary.

use super::action::{c0, Action, CsiAction};
use super::params::Params;
use super::utf8::{Utf8Decoder, Utf8Result, REPLACEMENT_CHAR};

/// Maximum length for OSC/DCS data to prevent DoS
pub const MAX_OSC_LEN: usize = 65536;
/// Maximum number of intermediate bytes
const MAX_INTERMEDIATES: usize = 4;
/// Raw bytes of a malformed sequence kept for diagnostics
const MAX_RAW_LEN: usize = 64;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Normal text processing
    Ground,
    /// After ESC
    Escape,
    /// ESC followed by intermediate bytes
    EscapeIntermediate,
    /// After ESC [
    CsiEntry,
    /// Collecting CSI parameters
    CsiParam,
    /// Collecting CSI intermediate bytes
    CsiIntermediate,
    /// CSI sequence is malformed, consume until final byte
    CsiIgnore,
    /// After ESC ]
    OscString,
    /// After ESC P
    DcsString,
    /// After ESC X, ESC ^ or ESC _ (SOS/PM/APC), consumed and ignored
    IgnoreString,
}

/// The terminal parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    utf8: Utf8Decoder,
    params: Params,
    /// CSI or ESC intermediate bytes
    intermediates: Vec<u8>,
    /// CSI prefix marker
    marker: Option<u8>,
    /// OSC/DCS string data
    string_data: Vec<u8>,
    /// Introducer of the string being ignored (`X`, `^` or `_`)
    string_kind: u8,
    /// Raw bytes of the current escape sequence, for diagnostics
    raw: Vec<u8>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            utf8: Utf8Decoder::new(),
            params: Params::new(),
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            marker: None,
            string_data: Vec::with_capacity(256),
            string_kind: 0,
            raw: Vec::with_capacity(MAX_RAW_LEN),
        }
    }

    /// Get current parser state
    pub fn state(&self) -> State {
        self.state
    }

    /// Reset parser to ground state, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.utf8.reset();
        self.params.clear();
        self.intermediates.clear();
        self.marker = None;
        self.string_data.clear();
        self.raw.clear();
    }

    /// Parse a chunk of bytes, calling the callback for each action
    pub fn parse<F>(&mut self, data: &[u8], mut callback: F)
    where
        F: FnMut(Action),
    {
        for &byte in data {
            self.advance(byte, &mut callback);
        }
    }

    /// Parse a chunk and collect actions into a vector
    pub fn parse_collect(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();
        self.parse(data, |action| actions.push(action));
        actions
    }

    /// Advance the parser by one byte
    fn advance<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match self.state {
            State::OscString | State::DcsString | State::IgnoreString => {
                self.advance_string(byte, callback);
                return;
            }
            State::Ground if self.utf8.is_pending() => {
                // Mid-character the decoder sees every byte, ESC included
                let result = self.utf8.feed(byte);
                emit_utf8(result, callback);
                if result != Utf8Result::Interrupted {
                    return;
                }
                // Cut short: the byte starts over from a clean decoder
            }
            _ => {}
        }

        // C0 controls execute in every non-string state without changing it
        if byte < 0x20 {
            match byte {
                c0::ESC => self.enter_escape(),
                c0::CAN | c0::SUB => self.abort(byte, callback),
                _ => callback(Action::Execute(byte)),
            }
            return;
        }

        if byte == c0::DEL {
            return;
        }

        match self.state {
            State::Ground => self.handle_ground(byte, callback),
            State::Escape => self.handle_escape(byte, callback),
            State::EscapeIntermediate => self.handle_escape_intermediate(byte, callback),
            State::CsiEntry => self.handle_csi_entry(byte, callback),
            State::CsiParam => self.handle_csi_param(byte, callback),
            State::CsiIntermediate => self.handle_csi_intermediate(byte, callback),
            State::CsiIgnore => self.handle_csi_ignore(byte, callback),
            State::OscString | State::DcsString | State::IgnoreString => {}
        }
    }

    /// CAN/SUB: abandon the sequence in progress
    fn abort<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        if self.state != State::Ground {
            self.record(byte);
            callback(Action::Unknown(std::mem::take(&mut self.raw)));
        }
        self.state = State::Ground;
    }

    /// Append to the diagnostic copy of the current sequence
    fn record(&mut self, byte: u8) {
        if self.raw.len() < MAX_RAW_LEN {
            self.raw.push(byte);
        }
    }

    fn handle_ground<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        if byte < 0x80 {
            callback(Action::Print(byte as char));
            return;
        }
        let result = self.utf8.feed(byte);
        emit_utf8(result, callback);
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.intermediates.clear();
        self.raw.clear();
        self.raw.push(c0::ESC);
    }

    fn handle_escape<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        match byte {
            b'[' => self.enter_csi(),
            b']' => self.enter_string(State::OscString, byte),
            b'P' => self.enter_string(State::DcsString, byte),
            b'X' | b'^' | b'_' => self.enter_string(State::IgnoreString, byte),
            // ST outside a string terminates nothing
            b'\\' => self.state = State::Ground,
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = State::EscapeIntermediate;
            }
            0x30..=0x7E => {
                callback(Action::EscDispatch {
                    intermediates: Vec::new(),
                    final_byte: byte,
                });
                self.state = State::Ground;
            }
            _ => {
                callback(Action::Unknown(std::mem::take(&mut self.raw)));
                self.state = State::Ground;
            }
        }
    }

    fn handle_escape_intermediate<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        match byte {
            0x20..=0x2F => {
                if self.intermediates.len() < MAX_INTERMEDIATES {
                    self.intermediates.push(byte);
                }
            }
            0x30..=0x7E => {
                callback(Action::EscDispatch {
                    intermediates: std::mem::take(&mut self.intermediates),
                    final_byte: byte,
                });
                self.state = State::Ground;
            }
            _ => {
                callback(Action::Unknown(std::mem::take(&mut self.raw)));
                self.state = State::Ground;
            }
        }
    }

    fn enter_csi(&mut self) {
        self.state = State::CsiEntry;
        self.params.clear();
        self.intermediates.clear();
        self.marker = None;
    }

    fn handle_csi_entry<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        match byte {
            b'?' | b'>' | b'<' | b'=' | b'!' => {
                self.marker = Some(byte);
                self.state = State::CsiParam;
            }
            b'0'..=b'9' | b';' | b':' => {
                self.params.push_byte(byte);
                self.state = State::CsiParam;
            }
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(byte, callback),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn handle_csi_param<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        match byte {
            b'0'..=b'9' | b';' | b':' => self.params.push_byte(byte),
            0x20..=0x2F => {
                self.intermediates.push(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => self.dispatch_csi(byte, callback),
            // A marker after parameters, or a non-ASCII byte
            _ => self.state = State::CsiIgnore,
        }
    }

    fn handle_csi_intermediate<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        match byte {
            0x20..=0x2F if self.intermediates.len() < MAX_INTERMEDIATES => {
                self.intermediates.push(byte);
            }
            0x40..=0x7E => self.dispatch_csi(byte, callback),
            _ => self.state = State::CsiIgnore,
        }
    }

    fn handle_csi_ignore<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.record(byte);
        if (0x40..=0x7E).contains(&byte) {
            callback(Action::Unknown(std::mem::take(&mut self.raw)));
            self.state = State::Ground;
        }
    }

    fn dispatch_csi<F>(&mut self, final_byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        self.params.finish();
        let action = CsiAction {
            params: std::mem::take(&mut self.params),
            intermediates: std::mem::take(&mut self.intermediates),
            final_byte,
            marker: self.marker.take(),
        };
        callback(Action::CsiDispatch(action));
        self.state = State::Ground;
    }

    fn enter_string(&mut self, state: State, introducer: u8) {
        self.state = state;
        self.string_kind = introducer;
        self.string_data.clear();
    }

    /// Bytes inside OSC/DCS/SOS/PM/APC strings. Only BEL (OSC only), ESC,
    /// CAN and SUB are significant.
    fn advance_string<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            c0::BEL if self.state == State::OscString => {
                self.finish_string(callback);
                self.state = State::Ground;
            }
            c0::ESC => {
                // Either ST (ESC \) or the start of a new sequence. Both end
                // the string; the Escape state consumes the backslash.
                self.finish_string(callback);
                self.enter_escape();
            }
            c0::CAN | c0::SUB => {
                self.string_data.clear();
                self.raw.clear();
                self.record(c0::ESC);
                self.record(self.string_kind);
                self.record(byte);
                callback(Action::Unknown(std::mem::take(&mut self.raw)));
                self.state = State::Ground;
            }
            0x00..=0x1F => {}
            _ => {
                if self.string_data.len() < MAX_OSC_LEN {
                    self.string_data.push(byte);
                }
            }
        }
    }

    fn finish_string<F>(&mut self, callback: &mut F)
    where
        F: FnMut(Action),
    {
        let data = std::mem::take(&mut self.string_data);
        match self.state {
            State::OscString => callback(osc_action(data)),
            State::DcsString => callback(Action::DcsDispatch(data)),
            _ => {
                let mut raw = vec![c0::ESC, self.string_kind];
                raw.extend(data.iter().take(MAX_RAW_LEN));
                callback(Action::Unknown(raw));
            }
        }
    }
}

/// Split an OSC body at the first `;` into a numeric command id and payload.
/// A body without a numeric id is reported as unknown.
fn osc_action(data: Vec<u8>) -> Action {
    let split = data.iter().position(|&b| b == b';').unwrap_or(data.len());
    let command = std::str::from_utf8(&data[..split])
        .ok()
        .and_then(|id| id.parse::<u16>().ok());

    match command {
        Some(command) => {
            let payload = data.get(split + 1..).unwrap_or_default();
            Action::OscDispatch {
                command,
                payload: String::from_utf8_lossy(payload).into_owned(),
            }
        }
        None => {
            let mut raw = vec![c0::ESC, b']'];
            raw.extend(data.into_iter().take(MAX_RAW_LEN));
            Action::Unknown(raw)
        }
    }
}

/// Print the outcome of a decoder step. Malformed or interrupted
/// sequences print U+FFFD.
fn emit_utf8<F>(result: Utf8Result, callback: &mut F)
where
    F: FnMut(Action),
{
    match result {
        Utf8Result::Char(c) => callback(Action::Print(c)),
        Utf8Result::Invalid | Utf8Result::Interrupted => callback(Action::Print(REPLACEMENT_CHAR)),
        Utf8Result::Pending => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csi(actions: &[Action]) -> &CsiAction {
        match actions {
            [Action::CsiDispatch(csi)] => csi,
            other => panic!("expected one CSI action, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_print() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"Hello");
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Print('H'));
        assert_eq!(actions[4], Action::Print('o'));
    }

    #[test]
    fn test_parser_control() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\r\n\x07\x08\t");
        assert_eq!(
            actions,
            vec![
                Action::Execute(c0::CR),
                Action::Execute(c0::LF),
                Action::Execute(c0::BEL),
                Action::Execute(c0::BS),
                Action::Execute(c0::HT),
            ]
        );
    }

    #[test]
    fn test_parser_csi_cursor() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[10;20H");
        let csi = csi(&actions);
        assert_eq!(csi.final_byte, b'H');
        assert_eq!(csi.param(0, 1), 10);
        assert_eq!(csi.param(1, 1), 20);
        assert_eq!(csi.marker, None);
    }

    #[test]
    fn test_parser_csi_private() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[?25h");
        let csi = csi(&actions);
        assert!(csi.is_private(b'h'));
        assert_eq!(csi.param(0, 0), 25);
    }

    #[test]
    fn test_parser_csi_bang_marker() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[!p");
        let csi = csi(&actions);
        assert_eq!(csi.marker, Some(b'!'));
        assert_eq!(csi.final_byte, b'p');
    }

    #[test]
    fn test_parser_csi_intermediate() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[4 q");
        let csi = csi(&actions);
        assert_eq!(csi.intermediates, vec![b' ']);
        assert_eq!(csi.final_byte, b'q');
    }

    #[test]
    fn test_parser_csi_sgr() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[1;31;42m");
        let csi = csi(&actions);
        assert_eq!(csi.params.as_slice(), &[1, 31, 42]);
    }

    #[test]
    fn test_parser_csi_colon_subparams() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[38:2::1:2:3;4m");
        let csi = csi(&actions);
        assert_eq!(csi.params.as_slice(), &[38, 4]);
        assert_eq!(csi.params.subparams(0), &[2, 0, 1, 2, 3]);
        assert_eq!(csi.to_bytes(), b"\x1b[38:2:0:1:2:3;4m".to_vec());
    }

    #[test]
    fn test_parser_csi_control_inside() {
        // C0 controls execute without aborting the sequence
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[1\n0H");
        assert_eq!(actions[0], Action::Execute(c0::LF));
        assert!(matches!(&actions[1], Action::CsiDispatch(c) if c.param(0, 1) == 10));
    }

    #[test]
    fn test_parser_csi_ignore() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[1?2hX");
        assert_eq!(actions[0], Action::Unknown(b"\x1b[1?2h".to_vec()));
        assert_eq!(actions[1], Action::Print('X'));
        assert_eq!(parser.state(), State::Ground);
    }

    #[test]
    fn test_parser_esc_dispatch() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b7\x1b#8\x1b(B");
        assert_eq!(
            actions,
            vec![
                Action::EscDispatch {
                    intermediates: vec![],
                    final_byte: b'7'
                },
                Action::EscDispatch {
                    intermediates: vec![b'#'],
                    final_byte: b'8'
                },
                Action::EscDispatch {
                    intermediates: vec![b'('],
                    final_byte: b'B'
                },
            ]
        );
    }

    #[test]
    fn test_parser_osc_title_bel() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b]0;My Title\x07");
        assert_eq!(
            actions,
            vec![Action::OscDispatch {
                command: 0,
                payload: "My Title".to_string()
            }]
        );
    }

    #[test]
    fn test_parser_osc_st() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b]7;file://host/tmp\x1b\\A");
        assert_eq!(
            actions,
            vec![
                Action::OscDispatch {
                    command: 7,
                    payload: "file://host/tmp".to_string()
                },
                Action::Print('A'),
            ]
        );
    }

    #[test]
    fn test_parser_osc_without_payload() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b]104\x07");
        assert_eq!(
            actions,
            vec![Action::OscDispatch {
                command: 104,
                payload: String::new()
            }]
        );
    }

    #[test]
    fn test_parser_osc_non_numeric() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b]abc;x\x07");
        assert_eq!(actions, vec![Action::Unknown(b"\x1b]abc;x".to_vec())]);
    }

    #[test]
    fn test_parser_osc_length_capped() {
        let mut parser = Parser::new();
        let mut input = b"\x1b]2;".to_vec();
        input.extend(std::iter::repeat(b'a').take(MAX_OSC_LEN * 2));
        input.push(c0::BEL);
        let actions = parser.parse_collect(&input);
        match &actions[..] {
            [Action::OscDispatch { payload, .. }] => assert!(payload.len() < MAX_OSC_LEN),
            other => panic!("unexpected actions {other:?}"),
        }
    }

    #[test]
    fn test_parser_dcs_consumed() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1bP1$qm\x1b\\Z");
        assert_eq!(
            actions,
            vec![Action::DcsDispatch(b"1$qm".to_vec()), Action::Print('Z')]
        );
    }

    #[test]
    fn test_parser_apc_ignored() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b_payload\x1b\\Z");
        assert!(matches!(&actions[0], Action::Unknown(raw) if raw.starts_with(b"\x1b_")));
        assert_eq!(actions[1], Action::Print('Z'));
    }

    #[test]
    fn test_parser_unknown_escape_byte() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(&[0x1B, 0xC3, b'A']);
        assert_eq!(actions[0], Action::Unknown(vec![0x1B, 0xC3]));
        assert_eq!(actions[1], Action::Print('A'));
    }

    #[test]
    fn test_parser_can_aborts() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[12\x18A");
        assert!(matches!(actions[0], Action::Unknown(_)));
        assert_eq!(actions[1], Action::Print('A'));
    }

    #[test]
    fn test_parser_utf8() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect("Hello 世界 🎉".as_bytes());

        let chars: Vec<char> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Print(c) => Some(*c),
                _ => None,
            })
            .collect();

        assert_eq!(
            chars,
            vec!['H', 'e', 'l', 'l', 'o', ' ', '世', '界', ' ', '🎉']
        );
    }

    #[test]
    fn test_parser_utf8_interrupted_by_esc() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(&[0xE4, 0xB8, 0x1B, b'7']);
        assert_eq!(actions[0], Action::Print(REPLACEMENT_CHAR));
        assert!(matches!(actions[1], Action::EscDispatch { final_byte: b'7', .. }));
    }

    #[test]
    fn test_parser_utf8_interrupted_by_ascii() {
        let mut parser = Parser::new();
        let actions = parser.parse_collect(&[0xC3, b'x']);
        assert_eq!(actions, vec![Action::Print(REPLACEMENT_CHAR), Action::Print('x')]);
    }

    #[test]
    fn test_parser_utf8_interrupted_by_lead_byte() {
        // The interrupting lead byte begins a character of its own
        let mut parser = Parser::new();
        let mut actions = parser.parse_collect(&[0xE4, 0xB8, 0xC3]);
        actions.extend(parser.parse_collect(&[0xA9, 0x0A]));
        assert_eq!(
            actions,
            vec![
                Action::Print(REPLACEMENT_CHAR),
                Action::Print('é'),
                Action::Execute(0x0A),
            ]
        );
    }

    #[test]
    fn test_parser_streaming() {
        let mut parser = Parser::new();

        assert!(parser.parse_collect(b"\x1b[10").is_empty());
        let actions = parser.parse_collect(b";20H");
        let csi = csi(&actions);
        assert_eq!(csi.param(0, 1), 10);
        assert_eq!(csi.param(1, 1), 20);
    }

    #[test]
    fn test_parser_streaming_utf8() {
        let mut parser = Parser::new();

        // '中' = 0xE4 0xB8 0xAD
        assert!(parser.parse_collect(&[0xE4]).is_empty());
        assert!(parser.parse_collect(&[0xB8]).is_empty());
        assert_eq!(parser.parse_collect(&[0xAD]), vec![Action::Print('中')]);
    }

    #[test]
    fn test_parser_every_byte_from_every_state() {
        let prefixes: [&[u8]; 9] = [
            b"",
            b"\x1b",
            b"\x1b#",
            b"\x1b[",
            b"\x1b[1",
            b"\x1b[1 ",
            b"\x1b[1?",
            b"\x1b]0;x",
            b"\x1bPq",
        ];
        for prefix in prefixes {
            for byte in 0..=255u8 {
                let mut parser = Parser::new();
                parser.parse_collect(prefix);
                parser.parse_collect(&[byte]);
                // Always able to get back to ground
                parser.parse_collect(b"\x18");
                assert_eq!(parser.state(), State::Ground);
                assert_eq!(parser.parse_collect(b"A"), vec![Action::Print('A')]);
            }
        }
    }

    #[test]
    fn test_parser_reset() {
        let mut parser = Parser::new();
        parser.parse_collect(b"\x1b[10");
        assert_eq!(parser.state(), State::CsiParam);

        parser.reset();
        assert_eq!(parser.state(), State::Ground);
        assert_eq!(parser.parse_collect(b"A"), vec![Action::Print('A')]);
    }
}
