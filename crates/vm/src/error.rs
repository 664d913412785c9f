//! Runtime errors for the Intcode VM.
//!
//! Every error is fatal: once returned, the VM that produced it refuses to
//! execute further and returns the same error on each call. Every variant
//! carries the address of the faulting instruction (`at`).

use intcode_common::{DecodeError, Word};
use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The low two digits of the instruction word name no operation.
    #[error("unknown opcode {opcode} at address {at}")]
    UnknownOpcode { at: Word, opcode: u8 },

    /// A parameter mode digit outside {0, 1, 2}.
    #[error("invalid addressing mode {mode} for parameter {param} at address {at}")]
    InvalidMode { at: Word, param: usize, mode: u8 },

    /// The instruction word is negative or has digits above the third mode.
    #[error("malformed instruction word {word} at address {at}")]
    MalformedInstruction { at: Word, word: Word },

    /// A write target was encoded in immediate mode.
    #[error("write to immediate-mode parameter {param} at address {at}")]
    ImmediateWrite { at: Word, param: usize },

    /// An effective address (or jump target) below zero.
    #[error("negative address {address} at address {at}")]
    NegativeAddress { at: Word, address: Word },

    /// A stored value or relative base does not fit the configured word width.
    #[error("value {value} exceeds the 64-bit word width at address {at}")]
    Overflow { at: Word, value: Word },

    /// Relative mode or adjust-base used while the capability is disabled.
    #[error("relative addressing is disabled (address {at})")]
    RelativeModeDisabled { at: Word },
}

impl RuntimeError {
    /// Attach the instruction address to a decode failure.
    pub(crate) fn from_decode(at: Word, err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownOpcode(opcode) => RuntimeError::UnknownOpcode { at, opcode },
            DecodeError::InvalidMode { param, mode } => RuntimeError::InvalidMode { at, param, mode },
            DecodeError::NegativeWord(word) | DecodeError::ExcessModeDigits(word) => {
                RuntimeError::MalformedInstruction { at, word }
            }
        }
    }

    /// Address of the instruction that faulted.
    pub fn at(&self) -> &Word {
        match self {
            RuntimeError::UnknownOpcode { at, .. }
            | RuntimeError::InvalidMode { at, .. }
            | RuntimeError::MalformedInstruction { at, .. }
            | RuntimeError::ImmediateWrite { at, .. }
            | RuntimeError::NegativeAddress { at, .. }
            | RuntimeError::Overflow { at, .. }
            | RuntimeError::RelativeModeDisabled { at } => at,
        }
    }
}
