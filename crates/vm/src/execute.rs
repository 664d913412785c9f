//! Main execution loop and opcode dispatch for the Intcode VM.

use crate::error::RuntimeError;
use crate::machine::{State, Vm};
use intcode_common::{Instruction, Mode, Opcode, Word};
use num_traits::{One, Signed, Zero};

impl Vm {
    /// Execute until an output is produced, the program halts, or input
    /// runs dry.
    ///
    /// Returns [`State::Output`], [`State::Halted`] or
    /// [`State::AwaitingInput`]. Calling `run` on a halted VM is a no-op that
    /// returns `Halted` again.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] on an unknown opcode, bad addressing mode,
    /// negative address or overflow. The VM is then [`State::Fatal`] and
    /// every later call returns the same error.
    pub fn run(&mut self) -> Result<State, RuntimeError> {
        loop {
            match self.step()? {
                State::Running => continue,
                state => return Ok(state),
            }
        }
    }

    /// Execute a single instruction.
    ///
    /// Returns [`State::Running`] if execution can simply continue.
    pub fn step(&mut self) -> Result<State, RuntimeError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        if self.state == State::Halted {
            return Ok(State::Halted);
        }

        self.state = State::Running;
        match self.execute_next() {
            Ok(state) => {
                self.state = state;
                Ok(state)
            }
            Err(err) => {
                self.state = State::Fatal;
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run until the program halts or starves, collecting every output.
    ///
    /// Check [`Vm::state`] afterwards to tell the two apart.
    pub fn drain(&mut self) -> Result<Vec<Word>, RuntimeError> {
        let mut outputs = Vec::new();
        loop {
            match self.run()? {
                State::Output => outputs.extend(self.output.clone()),
                _ => return Ok(outputs),
            }
        }
    }

    /// Render the instruction at the instruction pointer without executing
    /// it or touching memory. Returns `None` if the word does not decode.
    pub fn current_instruction(&self) -> Option<String> {
        let instr = Instruction::decode(&self.memory.get(self.ip.clone())).ok()?;
        let operands: Vec<Word> = (1..instr.width())
            .map(|offset| self.memory.get(&self.ip + Word::from(offset)))
            .collect();
        Some(instr.render(&operands))
    }

    fn execute_next(&mut self) -> Result<State, RuntimeError> {
        self.check_address(self.ip.clone())?;
        let word = self.memory.read(&self.ip);
        let instr = Instruction::decode(&word)
            .map_err(|e| RuntimeError::from_decode(self.ip.clone(), e))?;

        match instr.opcode {
            Opcode::Add => {
                let (a, b) = (self.load(&instr, 0)?, self.load(&instr, 1)?);
                let dst = self.target(&instr, 2)?;
                self.store(dst, a + b)?;
                self.advance(4);
            }
            Opcode::Mul => {
                let (a, b) = (self.load(&instr, 0)?, self.load(&instr, 1)?);
                let dst = self.target(&instr, 2)?;
                self.store(dst, a * b)?;
                self.advance(4);
            }
            Opcode::Input => {
                // Resolve the target first so a faulting instruction never
                // swallows an input value.
                let dst = self.target(&instr, 0)?;
                let Some(value) = self.next_input() else {
                    return Ok(State::AwaitingInput);
                };
                self.store(dst, value)?;
                self.advance(2);
            }
            Opcode::Output => {
                let value = self.load(&instr, 0)?;
                self.output = Some(value);
                self.advance(2);
                return Ok(State::Output);
            }
            Opcode::JumpIfTrue => self.exec_jump(&instr, |v| !v.is_zero())?,
            Opcode::JumpIfFalse => self.exec_jump(&instr, |v| v.is_zero())?,
            Opcode::LessThan => self.exec_compare(&instr, |a, b| a < b)?,
            Opcode::Equals => self.exec_compare(&instr, |a, b| a == b)?,
            Opcode::AdjustBase => {
                if !self.config.relative_mode {
                    return Err(RuntimeError::RelativeModeDisabled { at: self.ip.clone() });
                }
                let delta = self.load(&instr, 0)?;
                let base = &self.relative_base + delta;
                self.check_width(&base)?;
                self.relative_base = base;
                self.advance(2);
            }
            Opcode::Halt => return Ok(State::Halted),
        }

        Ok(State::Running)
    }

    fn exec_jump(&mut self, instr: &Instruction, taken: fn(&Word) -> bool) -> Result<(), RuntimeError> {
        let cond = self.load(instr, 0)?;
        let dest = self.load(instr, 1)?;
        if taken(&cond) {
            self.ip = dest;
        } else {
            self.advance(3);
        }
        Ok(())
    }

    fn exec_compare(
        &mut self,
        instr: &Instruction,
        holds: fn(&Word, &Word) -> bool,
    ) -> Result<(), RuntimeError> {
        let (a, b) = (self.load(instr, 0)?, self.load(instr, 1)?);
        let dst = self.target(instr, 2)?;
        let flag = if holds(&a, &b) { Word::one() } else { Word::zero() };
        self.store(dst, flag)?;
        self.advance(4);
        Ok(())
    }

    /// Raw operand word for parameter `idx` (0-based).
    fn operand(&mut self, idx: usize) -> Word {
        let addr = &self.ip + Word::from(idx + 1);
        self.memory.read(&addr)
    }

    /// Value of parameter `idx`, resolved through its addressing mode.
    fn load(&mut self, instr: &Instruction, idx: usize) -> Result<Word, RuntimeError> {
        let raw = self.operand(idx);
        match instr.modes[idx] {
            Mode::Immediate => Ok(raw),
            Mode::Position => {
                self.check_address(raw.clone())?;
                Ok(self.memory.read(&raw))
            }
            Mode::Relative => {
                let addr = self.relative_address(raw)?;
                Ok(self.memory.read(&addr))
            }
        }
    }

    /// Address written by parameter `idx`. Immediate mode is rejected.
    fn target(&mut self, instr: &Instruction, idx: usize) -> Result<Word, RuntimeError> {
        let raw = self.operand(idx);
        match instr.modes[idx] {
            Mode::Position => self.check_address(raw),
            Mode::Relative => self.relative_address(raw),
            Mode::Immediate => Err(RuntimeError::ImmediateWrite {
                at: self.ip.clone(),
                param: idx + 1,
            }),
        }
    }

    fn relative_address(&self, offset: Word) -> Result<Word, RuntimeError> {
        if !self.config.relative_mode {
            return Err(RuntimeError::RelativeModeDisabled { at: self.ip.clone() });
        }
        self.check_address(&self.relative_base + offset)
    }

    fn check_address(&self, address: Word) -> Result<Word, RuntimeError> {
        if address.is_negative() {
            return Err(RuntimeError::NegativeAddress {
                at: self.ip.clone(),
                address,
            });
        }
        Ok(address)
    }

    fn check_width(&self, value: &Word) -> Result<(), RuntimeError> {
        if self.config.word_width.fits(value) {
            Ok(())
        } else {
            Err(RuntimeError::Overflow {
                at: self.ip.clone(),
                value: value.clone(),
            })
        }
    }

    fn store(&mut self, addr: Word, value: Word) -> Result<(), RuntimeError> {
        self.check_width(&value)?;
        self.memory.write(addr, value);
        Ok(())
    }

    fn advance(&mut self, words: u32) {
        self.ip += words;
    }
}
