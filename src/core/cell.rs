//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and its associated presentation state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Color representation supporting the default, indexed and RGB colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette entry (0-255)
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

/// Standard ANSI palette (0-7) followed by the bright variants (8-15)
const ANSI_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // Black
    (205, 0, 0),     // Red
    (0, 205, 0),     // Green
    (205, 205, 0),   // Yellow
    (0, 0, 238),     // Blue
    (205, 0, 205),   // Magenta
    (0, 205, 205),   // Cyan
    (229, 229, 229), // White
    (127, 127, 127), // Bright Black
    (255, 0, 0),     // Bright Red
    (0, 255, 0),     // Bright Green
    (255, 255, 0),   // Bright Yellow
    (92, 92, 255),   // Bright Blue
    (255, 0, 255),   // Bright Magenta
    (0, 255, 255),   // Bright Cyan
    (255, 255, 255), // Bright White
];

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Convert a 256-color index to RGB
    ///
    /// 0-15 come from the ANSI palette, 16-231 form a 6x6x6 cube where each
    /// digit scales by 51, and 232-255 are a grayscale ramp starting at 8.
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0..=15 => ANSI_PALETTE[index as usize],
            16..=231 => {
                let n = index - 16;
                let r = n / 36;
                let g = (n / 6) % 6;
                let b = n % 6;
                (r * 51, g * 51, b * 51)
            }
            232..=255 => {
                let gray = (index - 232) * 10 + 8;
                (gray, gray, gray)
            }
        }
    }

    /// Resolve to RGB, using `default` for `Color::Default`
    pub fn to_rgb(self, default: (u8, u8, u8)) -> (u8, u8, u8) {
        match self {
            Color::Default => default,
            Color::Indexed(i) => Self::indexed_to_rgb(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    pub fn is_default(self) -> bool {
        matches!(self, Color::Default)
    }

    /// Palette index in the renderer encoding: `-1` for RGB values,
    /// `0..=255` for palette entries. Default colors also report `-1`;
    /// check [`Color::is_default`] first.
    pub fn index(self) -> i16 {
        match self {
            Color::Indexed(i) => i as i16,
            Color::Default | Color::Rgb(..) => -1,
        }
    }

    /// Flatten into the three-way encoding renderers branch on
    pub fn encode(self) -> EncodedColor {
        match self {
            Color::Default => EncodedColor {
                default: true,
                index: -1,
                r: 0,
                g: 0,
                b: 0,
            },
            Color::Indexed(i) => {
                let (r, g, b) = Self::indexed_to_rgb(i);
                EncodedColor {
                    default: false,
                    index: i as i16,
                    r,
                    g,
                    b,
                }
            }
            Color::Rgb(r, g, b) => EncodedColor {
                default: false,
                index: -1,
                r,
                g,
                b,
            },
        }
    }
}

/// Flat color encoding consumed by renderers.
///
/// `default == true` means "use the configured default", otherwise
/// `index == -1` means the RGB triple is authoritative and `0..=255` names a
/// palette entry (the triple then holds the standard palette value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedColor {
    pub default: bool,
    pub index: i16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<EncodedColor> for Color {
    fn from(enc: EncodedColor) -> Self {
        if enc.default {
            Color::Default
        } else if (0..=255).contains(&enc.index) {
            Color::Indexed(enc.index as u8)
        } else {
            Color::Rgb(enc.r, enc.g, enc.b)
        }
    }
}

bitflags! {
    /// Text attributes applied to a cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CellAttributes: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const BLINK     = 0b0001_0000;
        const REVERSE   = 0b0010_0000;
        const HIDDEN    = 0b0100_0000;
        const STRIKE    = 0b1000_0000;
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell
    pub ch: char,
    /// Display width: 1 or 2 for a character, 0 for the trailing half of a
    /// wide character
    pub width: u8,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub attrs: CellAttributes,
}

impl Cell {
    /// The empty cell: a space with default colors and no attributes
    pub const BLANK: Cell = Cell {
        ch: ' ',
        width: 1,
        fg: Color::Default,
        bg: Color::Default,
        attrs: CellAttributes::empty(),
    };

    /// Create a new cell with a single character
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            ..Self::BLANK
        }
    }

    /// Create a new cell with content and presentation state
    pub fn with_style(ch: char, width: u8, fg: Color, bg: Color, attrs: CellAttributes) -> Self {
        Self {
            ch,
            width,
            fg,
            bg,
            attrs,
        }
    }

    /// Check if this cell is blank
    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }

    /// Check if this cell is the placeholder after a double-width character
    pub fn is_wide_continuation(&self) -> bool {
        self.width == 0
    }

    /// Clear the cell to the empty cell
    pub fn clear(&mut self) {
        *self = Self::BLANK;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
