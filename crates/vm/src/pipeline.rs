//! Chains of VMs driven round-robin on the calling thread.

use crate::config::Config;
use crate::error::RuntimeError;
use crate::machine::{State, Vm};
use intcode_common::{Program, Word};

/// A chain of VMs built from one program, each stage's outputs feeding the
/// next stage's input queue.
///
/// Every stage first receives its own phase setting. With feedback enabled
/// the last stage's outputs are routed back to the first stage and the chain
/// keeps cycling until the last stage halts.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Vm>,
    feedback: bool,
}

impl Pipeline {
    /// Build one stage per phase value.
    pub fn new(program: &Program, phases: &[Word]) -> Self {
        Self::with_config(program, phases, Config::default())
    }

    /// Build one stage per phase value with an explicit VM configuration.
    pub fn with_config(program: &Program, phases: &[Word], config: Config) -> Self {
        let stages = phases
            .iter()
            .map(|phase| {
                let mut vm = Vm::with_config(program, config);
                vm.push_input(phase.clone());
                vm
            })
            .collect();
        Self {
            stages,
            feedback: false,
        }
    }

    /// Route the last stage's outputs back into the first stage.
    pub fn feedback(mut self, enabled: bool) -> Self {
        self.feedback = enabled;
        self
    }

    /// The stages, in chain order.
    pub fn stages(&self) -> &[Vm] {
        &self.stages
    }

    /// Feed `signal` into the first stage and drive the chain.
    ///
    /// Returns the last value the final stage produced, or `None` if it
    /// never produced one. Driving stops after one pass without feedback,
    /// and with feedback once the final stage halts or a full cycle moves
    /// no data.
    pub fn run(&mut self, signal: impl Into<Word>) -> Result<Option<Word>, RuntimeError> {
        if self.stages.is_empty() {
            return Ok(None);
        }
        let mut carry = vec![signal.into()];
        let mut last = None;

        loop {
            let mut progressed = false;
            for stage in &mut self.stages {
                stage.extend_input(carry.drain(..));
                carry = stage.drain()?;
                progressed |= !carry.is_empty();
            }
            if let Some(value) = carry.last() {
                last = Some(value.clone());
            }

            let finished = self
                .stages
                .last()
                .map_or(true, |stage| stage.state() == State::Halted);
            if !self.feedback || finished || !progressed {
                return Ok(last);
            }
        }
    }
}
