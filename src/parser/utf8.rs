//! UTF-8 decoding for the terminal parser
//!
//! Streaming decoder: a multi-byte character may be split across any number
//! of `parse` calls. Malformed input decodes to U+FFFD and never stalls the
//! stream.

/// Substituted for every malformed sequence
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

const UNICODE_MAX_CODE_POINT: u32 = 0x10FFFF;
const UNICODE_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;

/// Check if a byte is a UTF-8 continuation byte (0b10xx_xxxx)
fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// UTF-8 decoder state
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    /// Bytes accumulated for current character
    buffer: [u8; 4],
    /// Number of bytes in buffer
    len: usize,
    /// Expected total bytes for current character
    expected: usize,
}

/// Result of feeding a byte to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Result {
    /// Need more bytes
    Pending,
    /// Successfully decoded a character
    Char(char),
    /// Malformed sequence; emit [`REPLACEMENT_CHAR`]
    Invalid,
    /// The pending sequence was cut short by a byte that is not a
    /// continuation. Emit [`REPLACEMENT_CHAR`], then process the byte again
    /// from a clean state.
    Interrupted,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    /// Check if decoder is in the middle of a sequence
    pub fn is_pending(&self) -> bool {
        self.len > 0
    }

    /// Feed a byte to the decoder
    pub fn feed(&mut self, byte: u8) -> Utf8Result {
        if self.len == 0 {
            return self.start(byte);
        }

        if !is_continuation(byte) {
            self.reset();
            return Utf8Result::Interrupted;
        }

        self.buffer[self.len] = byte;
        self.len += 1;
        if self.len < self.expected {
            return Utf8Result::Pending;
        }

        let result = self.decode();
        self.reset();
        result
    }

    fn start(&mut self, byte: u8) -> Utf8Result {
        let expected = match byte {
            0x00..=0x7F => return Utf8Result::Char(byte as char),
            // Lead bytes 0xC0/0xC1 always yield an overlong form, rejected
            // once the sequence completes
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            // Stray continuation or a byte never valid in UTF-8
            _ => return Utf8Result::Invalid,
        };
        self.buffer[0] = byte;
        self.len = 1;
        self.expected = expected;
        Utf8Result::Pending
    }

    fn decode(&self) -> Utf8Result {
        let b = &self.buffer;
        let (cp, min) = match self.expected {
            2 => ((b[0] as u32 & 0x1F) << 6 | (b[1] as u32 & 0x3F), 0x80),
            3 => (
                (b[0] as u32 & 0x0F) << 12 | (b[1] as u32 & 0x3F) << 6 | (b[2] as u32 & 0x3F),
                0x800,
            ),
            4 => (
                (b[0] as u32 & 0x07) << 18
                    | (b[1] as u32 & 0x3F) << 12
                    | (b[2] as u32 & 0x3F) << 6
                    | (b[3] as u32 & 0x3F),
                0x10000,
            ),
            _ => return Utf8Result::Invalid,
        };

        if cp < min || cp > UNICODE_MAX_CODE_POINT || UNICODE_SURROGATES.contains(&cp) {
            return Utf8Result::Invalid;
        }
        char::from_u32(cp).map_or(Utf8Result::Invalid, Utf8Result::Char)
    }
}
