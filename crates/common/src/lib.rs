//! Intcode common types and instruction decoding.
//!
//! This crate provides the foundational data structures for the Intcode
//! machine:
//!
//! - [`Word`]: the arbitrary-precision signed integer every cell holds
//! - [`Opcode`]: the ten supported operations
//! - [`Mode`] and [`Instruction`]: decoding of raw instruction words
//! - [`Program`]: an immutable image in the comma-separated wire format
//! - [`disassemble`]: a linear-sweep listing of a program image
//! - [`DecodeError`] and [`LoadError`]

pub mod disassembler;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

/// A memory cell, operand, input or output value.
///
/// Intermediate results routinely exceed 64 bits, so words are unbounded.
pub type Word = num_bigint::BigInt;

// Re-export commonly used types at the crate root.
pub use disassembler::disassemble;
pub use error::{DecodeError, LoadError};
pub use instruction::{Instruction, Mode};
pub use opcode::Opcode;
pub use program::Program;
