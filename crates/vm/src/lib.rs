//! Intcode virtual machine: executes program images with suspend/resume I/O.
//!
//! The VM is a register machine with:
//! - Sparse, unbounded memory seeded from a [`Program`] image
//! - An instruction pointer and a relative base register
//! - A FIFO input queue plus an optional [`InputProvider`]
//! - A single output slot
//!
//! [`Vm::run`] executes until an output is produced, the program halts, or
//! an input instruction finds nothing to read. The caller inspects the
//! returned [`State`], supplies input and runs again.
//!
//! # Usage
//!
//! ```
//! use intcode_common::{Program, Word};
//! use intcode_vm::{State, Vm};
//!
//! // Outputs 1 if the input equals 8, else 0.
//! let program: Program = "3,9,8,9,10,9,4,9,99,-1,8".parse().unwrap();
//! let mut vm = Vm::new(&program);
//!
//! assert_eq!(vm.run().unwrap(), State::AwaitingInput);
//! vm.push_input(8);
//! assert_eq!(vm.run().unwrap(), State::Output);
//! assert_eq!(vm.output(), Some(&Word::from(1)));
//! assert_eq!(vm.run().unwrap(), State::Halted);
//! ```
//!
//! Several VMs can be chained on one thread with [`Pipeline`] or run as a
//! threaded [`Network`] exchanging packets through [`Mailbox`]es.

pub mod ascii;
pub mod config;
pub mod error;
pub mod execute;
pub mod input;
pub mod machine;
pub mod mailbox;
pub mod memory;
pub mod network;
pub mod pipeline;

pub use config::{Config, WordWidth};
pub use error::RuntimeError;
pub use input::{Constant, InputProvider};
pub use machine::{State, Vm};
pub use mailbox::{Mailbox, MailboxReader};
pub use memory::Memory;
pub use network::{Network, NetworkConfig, Packet};
pub use pipeline::Pipeline;

use intcode_common::{Program, Word};

/// Run a program on a fresh VM with the given inputs.
///
/// Executes until the program halts or needs more input than was supplied,
/// and returns every output together with the final state
/// ([`State::Halted`] or [`State::AwaitingInput`]).
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution faults.
pub fn run<I>(program: &Program, inputs: I) -> Result<(Vec<Word>, State), RuntimeError>
where
    I: IntoIterator,
    I::Item: Into<Word>,
{
    let mut vm = Vm::new(program);
    vm.extend_input(inputs);
    let outputs = vm.drain()?;
    Ok((outputs, vm.state()))
}
