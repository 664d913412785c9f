//! Opcode definitions for the Intcode instruction set.

use crate::error::DecodeError;

/// Identifies the operation to perform.
///
/// The discriminant is the value of the low two decimal digits of an
/// instruction word.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `mem[c] = a + b`.
    Add = 1,
    /// `mem[c] = a * b`.
    Mul = 2,
    /// Read one input value into `mem[a]`.
    Input = 3,
    /// Produce `a` as output and suspend.
    Output = 4,
    /// Jump to `b` if `a` is non-zero.
    JumpIfTrue = 5,
    /// Jump to `b` if `a` is zero.
    JumpIfFalse = 6,
    /// `mem[c] = 1` if `a < b`, else 0.
    LessThan = 7,
    /// `mem[c] = 1` if `a == b`, else 0.
    Equals = 8,
    /// Add `a` to the relative base.
    AdjustBase = 9,
    /// Stop execution.
    Halt = 99,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 10] = [
    Opcode::Add,
    Opcode::Mul,
    Opcode::Input,
    Opcode::Output,
    Opcode::JumpIfTrue,
    Opcode::JumpIfFalse,
    Opcode::LessThan,
    Opcode::Equals,
    Opcode::AdjustBase,
    Opcode::Halt,
];

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Mul),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            9 => Ok(Opcode::AdjustBase),
            99 => Ok(Opcode::Halt),
            _ => Err(DecodeError::UnknownOpcode(value)),
        }
    }
}

impl Opcode {
    /// Returns the disassembly mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Mul => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JNZ",
            Opcode::JumpIfFalse => "JZ",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustBase => "ARB",
            Opcode::Halt => "HALT",
        }
    }

    /// Number of parameters following the opcode word.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::Add | Opcode::Mul | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Index of the parameter this opcode writes to, if any.
    pub fn write_param(&self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Mul | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Input => Some(0),
            _ => None,
        }
    }
}
