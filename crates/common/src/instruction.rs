//! Instruction word decoding and encoding.
//!
//! An instruction word is a non-negative decimal number:
//! ```text
//! C B A O O
//! | | | +-+-- opcode (word mod 100)
//! | | +------ mode of parameter 1
//! | +-------- mode of parameter 2
//! +---------- mode of parameter 3
//! ```
//! Missing mode digits default to position mode.

use crate::error::DecodeError;
use crate::opcode::Opcode;
use crate::Word;
use num_traits::{Signed, ToPrimitive};
use std::fmt::Write;

/// Addressing mode of a single parameter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// The operand is an address to dereference.
    #[default]
    Position = 0,
    /// The operand is the value itself. Never valid for a write target.
    Immediate = 1,
    /// The operand is an offset from the relative base.
    Relative = 2,
}

/// All addressing modes.
pub const ALL_MODES: [Mode; 3] = [Mode::Position, Mode::Immediate, Mode::Relative];

impl Mode {
    fn from_digit(digit: u8, param: usize) -> Result<Self, DecodeError> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            mode => Err(DecodeError::InvalidMode { param, mode }),
        }
    }
}

/// A decoded instruction: the opcode and the modes of its three parameter slots.
///
/// Slots beyond the opcode's arity are carried but never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Parameter modes, in parameter order.
    pub modes: [Mode; 3],
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, modes: [Mode; 3]) -> Self {
        Self { opcode, modes }
    }

    /// Decode a raw instruction word.
    pub fn decode(word: &Word) -> Result<Self, DecodeError> {
        if word.is_negative() {
            return Err(DecodeError::NegativeWord(word.clone()));
        }
        // Anything past u64 necessarily carries more than three mode digits.
        let raw = word
            .to_u64()
            .ok_or_else(|| DecodeError::ExcessModeDigits(word.clone()))?;

        let opcode = Opcode::try_from((raw % 100) as u8)?;

        let mut rest = raw / 100;
        let mut modes = [Mode::Position; 3];
        for (param, slot) in modes.iter_mut().enumerate() {
            *slot = Mode::from_digit((rest % 10) as u8, param + 1)?;
            rest /= 10;
        }
        if rest != 0 {
            return Err(DecodeError::ExcessModeDigits(word.clone()));
        }

        Ok(Self { opcode, modes })
    }

    /// Encode this instruction back into its canonical word.
    pub fn encode(&self) -> Word {
        let [a, b, c] = self.modes;
        let raw = (c as u64) * 10_000 + (b as u64) * 1_000 + (a as u64) * 100 + self.opcode as u64;
        Word::from(raw)
    }

    /// Number of words this instruction occupies, opcode word included.
    pub fn width(&self) -> usize {
        1 + self.opcode.arity()
    }

    /// Format this instruction with its raw operands.
    ///
    /// Position operands render as `[n]`, immediate as `n`, relative as
    /// `[rb+n]` or `[rb-n]`. Extra operands are ignored.
    pub fn render(&self, operands: &[Word]) -> String {
        let mut out = self.opcode.mnemonic().to_string();
        for (idx, (operand, mode)) in operands
            .iter()
            .zip(self.modes)
            .take(self.opcode.arity())
            .enumerate()
        {
            out.push_str(if idx == 0 { " " } else { ", " });
            // Writing into a String cannot fail.
            let _ = match mode {
                Mode::Position => write!(out, "[{operand}]"),
                Mode::Immediate => write!(out, "{operand}"),
                Mode::Relative if operand.is_negative() => write!(out, "[rb-{}]", operand.abs()),
                Mode::Relative => write!(out, "[rb+{operand}]"),
            };
        }
        out
    }
}
