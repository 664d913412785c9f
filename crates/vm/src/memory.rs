//! Sparse, unbounded VM memory.

use intcode_common::{Program, Word};
use num_traits::Zero;
use std::collections::BTreeMap;

/// Address → word store with zero-fill on first read.
///
/// Reading an address that was never written yields zero and materializes
/// the cell, so [`Memory::len`] counts every address the program has touched.
/// Addresses are expected to be non-negative; the VM rejects negative
/// effective addresses before they reach memory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memory {
    cells: BTreeMap<Word, Word>,
}

impl Memory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a program image into fresh memory at addresses `0..N-1`.
    pub fn from_program(program: &Program) -> Self {
        let cells = program
            .words()
            .iter()
            .enumerate()
            .map(|(addr, word)| (Word::from(addr), word.clone()))
            .collect();
        Self { cells }
    }

    /// Read a cell, materializing it at zero if it was never set.
    pub fn read(&mut self, addr: &Word) -> Word {
        if let Some(value) = self.cells.get(addr) {
            return value.clone();
        }
        self.cells.insert(addr.clone(), Word::zero());
        Word::zero()
    }

    /// Read a cell without materializing it.
    pub fn get(&self, addr: impl Into<Word>) -> Word {
        self.cells.get(&addr.into()).cloned().unwrap_or_default()
    }

    /// Store a value.
    pub fn write(&mut self, addr: impl Into<Word>, value: impl Into<Word>) {
        self.cells.insert(addr.into(), value.into());
    }

    /// Returns true if the address has been read or written.
    pub fn contains(&self, addr: impl Into<Word>) -> bool {
        self.cells.contains_key(&addr.into())
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no cell is materialized.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Materialized cells in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.cells.iter()
    }

    /// The first `len` cells as a contiguous slice, unset cells reading as zero.
    pub fn dump(&self, len: usize) -> Vec<Word> {
        (0..len).map(|addr| self.get(addr)).collect()
    }
}
