//! Terminal escape sequence parser
//!
//! A stateful parser that converts bytes into terminal actions.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod action;
mod params;
mod state;
mod utf8;

pub use action::{c0, Action, CsiAction};
pub use params::{Params, MAX_PARAMS, MAX_SUBPARAMS};
pub use state::{Parser, State, MAX_OSC_LEN};
pub use utf8::{Utf8Decoder, Utf8Result, REPLACEMENT_CHAR};
