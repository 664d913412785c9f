//! VM state management: memory, registers, input queue, output slot.

use crate::ascii;
use crate::config::Config;
use crate::error::RuntimeError;
use crate::input::InputProvider;
use crate::memory::Memory;
use intcode_common::{Program, Word};
use num_traits::Zero;
use std::collections::VecDeque;
use std::fmt;

/// Observable execution state of a VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Ready to execute. Also the transient state while instructions run.
    Running,
    /// An output instruction ran; the value is in the output slot.
    Output,
    /// An input instruction found nothing to read. The instruction pointer
    /// still addresses it, so supplying input and running again resumes
    /// exactly where execution stopped.
    AwaitingInput,
    /// Halt executed. Further runs do nothing.
    Halted,
    /// A runtime error occurred. The VM must be discarded.
    Fatal,
}

/// One Intcode machine instance.
///
/// Each instance owns a private copy of its program's memory; nothing is
/// shared between instances.
pub struct Vm {
    /// Private memory, seeded from the program image.
    pub(crate) memory: Memory,
    /// Address of the next instruction word.
    pub(crate) ip: Word,
    /// Offset applied to relative-mode operands.
    pub(crate) relative_base: Word,
    /// Pending input values, consumed front first.
    pub(crate) inputs: VecDeque<Word>,
    /// Consulted when `inputs` is empty.
    pub(crate) provider: Option<Box<dyn InputProvider>>,
    /// Most recent output value.
    pub(crate) output: Option<Word>,
    pub(crate) state: State,
    /// The error that moved the VM to `Fatal`, returned again on every run.
    pub(crate) fault: Option<RuntimeError>,
    pub(crate) config: Config,
}

impl Vm {
    /// Create a VM for the given program with the default configuration.
    pub fn new(program: &Program) -> Self {
        Self::with_config(program, Config::default())
    }

    /// Create a VM with an explicit configuration.
    pub fn with_config(program: &Program, config: Config) -> Self {
        Self {
            memory: Memory::from_program(program),
            ip: Word::zero(),
            relative_base: Word::zero(),
            inputs: VecDeque::new(),
            provider: None,
            output: None,
            state: State::Running,
            fault: None,
            config,
        }
    }

    /// Attach an input provider, replacing any previous one.
    pub fn with_provider(mut self, provider: impl InputProvider + 'static) -> Self {
        self.set_provider(provider);
        self
    }

    /// Attach an input provider, replacing any previous one.
    pub fn set_provider(&mut self, provider: impl InputProvider + 'static) {
        self.provider = Some(Box::new(provider));
    }

    /// Detach the input provider.
    pub fn clear_provider(&mut self) {
        self.provider = None;
    }

    /// Append one value to the input queue. Never changes the state.
    pub fn push_input(&mut self, value: impl Into<Word>) {
        self.inputs.push_back(value.into());
    }

    /// Append several values to the input queue, in order.
    pub fn extend_input<I>(&mut self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Word>,
    {
        self.inputs.extend(values.into_iter().map(Into::into));
    }

    /// Append a line of text as character codes followed by a newline.
    pub fn push_line(&mut self, line: &str) {
        self.inputs.extend(ascii::encode_line(line));
    }

    /// Number of queued input values not yet consumed.
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Current execution state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The most recent output value.
    ///
    /// Meaningful after a run returned [`State::Output`]; later outputs
    /// overwrite it.
    pub fn output(&self) -> Option<&Word> {
        self.output.as_ref()
    }

    /// Take the most recent output value, leaving the slot empty.
    pub fn take_output(&mut self) -> Option<Word> {
        self.output.take()
    }

    /// The error that made this VM fatal, if any.
    pub fn fault(&self) -> Option<&RuntimeError> {
        self.fault.as_ref()
    }

    /// Address of the next instruction.
    pub fn ip(&self) -> &Word {
        &self.ip
    }

    /// Current relative base.
    pub fn relative_base(&self) -> &Word {
        &self.relative_base
    }

    /// The VM's private memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to memory, for patching a program before running it.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The configuration this VM was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deep-copy this session: memory, registers, queued input, output and
    /// state. The input provider is not copied.
    ///
    /// Useful for exploring alternatives from a common point and
    /// abandoning the branches that fail.
    pub fn fork(&self) -> Self {
        Self {
            memory: self.memory.clone(),
            ip: self.ip.clone(),
            relative_base: self.relative_base.clone(),
            inputs: self.inputs.clone(),
            provider: None,
            output: self.output.clone(),
            state: self.state,
            fault: self.fault.clone(),
            config: self.config,
        }
    }

    /// Take the next input value from the queue, then the provider.
    pub(crate) fn next_input(&mut self) -> Option<Word> {
        if let Some(value) = self.inputs.pop_front() {
            return Some(value);
        }
        self.provider.as_mut().and_then(|p| p.next_input())
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("ip", &self.ip)
            .field("relative_base", &self.relative_base)
            .field("state", &self.state)
            .field("pending_inputs", &self.inputs.len())
            .field("output", &self.output)
            .field("memory_cells", &self.memory.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vm_registers() {
        let vm = Vm::new(&Program::from(vec![99]));
        assert_eq!(vm.ip(), &Word::zero());
        assert_eq!(vm.relative_base(), &Word::zero());
        assert_eq!(vm.state(), State::Running);
        assert_eq!(vm.output(), None);
        assert_eq!(vm.memory().len(), 1);
    }

    #[test]
    fn queue_before_provider() {
        let mut vm = Vm::new(&Program::from(vec![99])).with_provider(|| Some(Word::from(-1)));
        vm.extend_input([5, 6]);
        assert_eq!(vm.next_input(), Some(Word::from(5)));
        assert_eq!(vm.next_input(), Some(Word::from(6)));
        assert_eq!(vm.next_input(), Some(Word::from(-1)));
        vm.clear_provider();
        assert_eq!(vm.next_input(), None);
    }

    #[test]
    fn push_line_appends_newline() {
        let mut vm = Vm::new(&Program::from(vec![99]));
        vm.push_line("NOT A J");
        assert_eq!(vm.pending_inputs(), 8);
        let codes: Vec<Word> = std::iter::from_fn(|| vm.next_input()).collect();
        assert_eq!(codes.first(), Some(&Word::from(78)));
        assert_eq!(codes.last(), Some(&Word::from(10)));
    }

    #[test]
    fn fork_copies_memory() {
        let mut vm = Vm::new(&Program::from(vec![1, 0, 0, 0, 99]));
        vm.push_input(3);
        let mut copy = vm.fork();
        copy.memory_mut().write(0, 42);
        assert_eq!(vm.memory().get(0), Word::from(1));
        assert_eq!(copy.pending_inputs(), 1);
    }
}
