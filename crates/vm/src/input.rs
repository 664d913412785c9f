//! Pluggable input sources.
//!
//! A VM always drains its own input queue first. When the queue is empty it
//! asks its [`InputProvider`], if one is attached. A provider that returns
//! `None` suspends the VM in [`State::AwaitingInput`](crate::State) until the
//! caller supplies more input.

use intcode_common::Word;

/// Supplies input values on demand.
///
/// Implementations may compute a value from external state (a game
/// controller reading the screen), return a constant placeholder when
/// nothing is pending, or block on a shared [`Mailbox`](crate::Mailbox).
pub trait InputProvider: Send {
    /// Produce the next input value, or `None` if nothing is available now.
    fn next_input(&mut self) -> Option<Word>;
}

impl<F> InputProvider for F
where
    F: FnMut() -> Option<Word> + Send,
{
    fn next_input(&mut self) -> Option<Word> {
        self()
    }
}

/// Provider that always answers with the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant(pub Word);

impl InputProvider for Constant {
    fn next_input(&mut self) -> Option<Word> {
        Some(self.0.clone())
    }
}
