//! Actions produced by the parser
//!
//! The parser only classifies bytes; what a sequence means for the screen is
//! decided by whoever consumes these actions.

use super::params::Params;

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a character to the screen
    Print(char),

    /// Execute a C0 control character
    Execute(u8),

    /// ESC sequence (non-CSI), e.g. `ESC 7` or `ESC # 8`
    EscDispatch { intermediates: Vec<u8>, final_byte: u8 },

    /// CSI (Control Sequence Introducer) sequence
    CsiDispatch(CsiAction),

    /// OSC (Operating System Command) with a numeric command id
    OscDispatch { command: u16, payload: String },

    /// DCS (Device Control String) payload, consumed but not interpreted
    DcsDispatch(Vec<u8>),

    /// Malformed or unsupported sequence, as raw bytes
    Unknown(Vec<u8>),
}

/// A complete CSI sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiAction {
    /// Parameters (semicolon-separated numbers)
    pub params: Params,
    /// Intermediate bytes (0x20-0x2F)
    pub intermediates: Vec<u8>,
    /// Final byte (0x40-0x7E)
    pub final_byte: u8,
    /// Prefix marker: `?`, `>`, `<`, `=` or `!`
    pub marker: Option<u8>,
}

impl CsiAction {
    /// Get a parameter, substituting `default` when absent or zero
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get_or(index, default)
    }

    /// Check if this is a plain CSI sequence with the given final byte
    pub fn is(&self, final_byte: u8) -> bool {
        self.final_byte == final_byte && self.intermediates.is_empty() && self.marker.is_none()
    }

    /// Check if this is a DEC private (`?`) sequence with the given final byte
    pub fn is_private(&self, final_byte: u8) -> bool {
        self.final_byte == final_byte && self.intermediates.is_empty() && self.marker == Some(b'?')
    }

    /// Re-encode the sequence, for diagnostics
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0x1B, b'['];
        bytes.extend(self.marker);
        let params: Vec<String> = self
            .params
            .iter_with_subparams()
            .map(|(value, subs)| {
                std::iter::once(value)
                    .chain(subs.iter().copied())
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(":")
            })
            .collect();
        bytes.extend_from_slice(params.join(";").as_bytes());
        bytes.extend_from_slice(&self.intermediates);
        bytes.push(self.final_byte);
        bytes
    }
}

/// C0 control characters
pub mod c0 {
    pub const NUL: u8 = 0x00;
    pub const BEL: u8 = 0x07;
    pub const BS: u8 = 0x08;
    pub const HT: u8 = 0x09;
    pub const LF: u8 = 0x0A;
    pub const VT: u8 = 0x0B;
    pub const FF: u8 = 0x0C;
    pub const CR: u8 = 0x0D;
    pub const SO: u8 = 0x0E;
    pub const SI: u8 = 0x0F;
    pub const CAN: u8 = 0x18;
    pub const SUB: u8 = 0x1A;
    pub const ESC: u8 = 0x1B;
    pub const DEL: u8 = 0x7F;
}
