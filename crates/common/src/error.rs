//! Decode and load errors for Intcode program images.

use crate::Word;
use thiserror::Error;

/// Errors that occur while decoding a single instruction word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The low two digits do not name a supported opcode.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    /// A mode digit outside {0, 1, 2}.
    #[error("invalid addressing mode {mode} for parameter {param}")]
    InvalidMode { param: usize, mode: u8 },

    /// Instruction words are never negative.
    #[error("negative instruction word {0}")]
    NegativeWord(Word),

    /// Non-zero digits above the third parameter mode.
    #[error("instruction word {0} has more than three mode digits")]
    ExcessModeDigits(Word),
}

/// Errors that occur while loading a program image from its wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The image contains no tokens at all.
    #[error("empty program image")]
    Empty,

    /// A comma-separated token is empty or not a decimal integer.
    #[error("invalid token {token:?} at position {index}")]
    InvalidToken { index: usize, token: String },
}
