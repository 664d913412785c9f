//! Capability flags for a VM instance.

use intcode_common::Word;
use num_traits::ToPrimitive;

/// Integer width of stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordWidth {
    /// Arbitrary precision. Nothing ever overflows.
    #[default]
    Unbounded,
    /// Signed 64-bit. Storing a value outside `i64` is a fatal overflow.
    Bits64,
}

impl WordWidth {
    /// Returns true if `value` is representable at this width.
    pub fn fits(&self, value: &Word) -> bool {
        match self {
            WordWidth::Unbounded => true,
            WordWidth::Bits64 => value.to_i64().is_some(),
        }
    }
}

/// VM configuration.
///
/// The default is the full machine: unbounded words and relative mode on.
/// Early programs that predate relative addressing can be run with
/// `relative_mode(false)` to turn stray mode-2 digits into errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Width of values written to memory and of the relative base.
    pub word_width: WordWidth,
    /// Whether relative mode and the adjust-base opcode are available.
    pub relative_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_width: WordWidth::Unbounded,
            relative_mode: true,
        }
    }
}

impl Config {
    /// Set the word width.
    pub fn word_width(mut self, width: WordWidth) -> Self {
        self.word_width = width;
        self
    }

    /// Enable or disable relative addressing.
    pub fn relative_mode(mut self, enabled: bool) -> Self {
        self.relative_mode = enabled;
        self
    }
}
