//! CSI parameter parsing
//!
//! Parameters are accumulated byte by byte as the CSI sequence streams in,
//! so a sequence split across `parse` calls needs no re-scanning.
//!
//! `;` separates parameters. `:` attaches sub-parameters to the parameter
//! before it (ITU T.416 style, as in `38:2::255:0:0`).

/// Maximum number of parameters we'll track. Extra parameters are dropped.
pub const MAX_PARAMS: usize = 32;

/// Maximum sub-parameters kept per parameter
pub const MAX_SUBPARAMS: usize = 8;

/// CSI parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Completed parameter values (0 means default/unspecified)
    values: Vec<u16>,
    /// Colon-separated values following each parameter, parallel to `values`
    subparams: Vec<Vec<u16>>,
    /// Parameter currently being accumulated
    current: u16,
    /// Whether any byte of the current parameter (or a preceding separator)
    /// has been seen
    open: bool,
    /// The current value follows a `:`
    in_subparam: bool,
    /// A parameter was dropped at the cap; its sub-parameters go too
    overflowed: bool,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create params from a slice
    pub fn from_slice(values: &[u16]) -> Self {
        let values: Vec<u16> = values.iter().copied().take(MAX_PARAMS).collect();
        Self {
            subparams: vec![Vec::new(); values.len()],
            values,
            ..Self::default()
        }
    }

    /// Parse parameters from bytes
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params = Self::new();
        for &byte in bytes {
            params.push_byte(byte);
        }
        params.finish();
        params
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.subparams.clear();
        self.current = 0;
        self.open = false;
        self.in_subparam = false;
        self.overflowed = false;
    }

    /// Feed one parameter byte (digit or separator); anything else is ignored
    pub fn push_byte(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => {
                self.current = self
                    .current
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u16);
                self.open = true;
            }
            b';' | b':' => {
                self.push_current();
                // The separator opens the next (possibly empty) value
                self.in_subparam = byte == b':';
                self.open = true;
            }
            _ => {}
        }
    }

    /// Close the parameter being accumulated. Called at the final byte.
    pub fn finish(&mut self) {
        if self.open {
            self.push_current();
        }
        self.open = false;
        self.in_subparam = false;
    }

    fn push_current(&mut self) {
        let value = std::mem::take(&mut self.current);
        if self.in_subparam {
            if self.overflowed {
                return;
            }
            if let Some(group) = self.subparams.last_mut() {
                if group.len() < MAX_SUBPARAMS {
                    group.push(value);
                }
            }
        } else if self.values.len() < MAX_PARAMS {
            self.values.push(value);
            self.subparams.push(Vec::new());
        } else {
            self.overflowed = true;
        }
    }

    /// Get parameter at index, returning None if absent or zero
    pub fn get(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied().filter(|&v| v != 0)
    }

    /// Get parameter at index, substituting `default` if absent or zero
    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    /// Get raw value at index (0 if not present)
    pub fn raw(&self, index: usize) -> u16 {
        self.values.get(index).copied().unwrap_or(0)
    }

    /// Sub-parameters attached to the parameter at index (empty if none)
    pub fn subparams(&self, index: usize) -> &[u16] {
        self.subparams.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Top-level parameter values, sub-parameters excluded
    pub fn as_slice(&self) -> &[u16] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.values.iter().copied()
    }

    /// Parameters paired with their sub-parameters
    pub fn iter_with_subparams(&self) -> impl Iterator<Item = (u16, &[u16])> + '_ {
        self.values
            .iter()
            .copied()
            .zip(self.subparams.iter().map(Vec::as_slice))
    }
}
