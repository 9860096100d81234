//! The machine run loop and per-instruction execution.
//!
//! A [`Vm`] owns one memory (cloned from a program), one instruction pointer,
//! one relative base, and a halted flag. Its input and output are externally
//! supplied channel ends shared with sibling machines; popping an empty input
//! is the only point where execution suspends.

use crate::machine::decoder::{Instruction, decode};
use crate::machine::errors::VmError;
use crate::machine::isa::{IsaVersion, Opcode};
use crate::machine::memory::Memory;
use crate::machine::operand::{read_operand, write_operand};
use crate::machine::program::Program;
use crate::network::channel::{Sink, Source};
use std::sync::Arc;

/// Control-flow outcome of executing one instruction.
///
/// An explicit tagged variant: the executor's contract is exhaustively
/// checkable by the run loop instead of relying on sentinel values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Fall through to the decoder's next pointer.
    Continue,
    /// Set the instruction pointer explicitly.
    JumpTo(i64),
    /// Add the delta to the relative base, then fall through.
    AdjustBase(i64),
    /// Terminate the machine.
    Halt,
}

/// One virtual machine instance.
pub struct Vm {
    memory: Memory,
    ip: i64,
    relative_base: i64,
    halted: bool,
    version: IsaVersion,
    input: Arc<dyn Source>,
    output: Arc<dyn Sink>,
}

impl Vm {
    /// Creates a machine running the full instruction set.
    pub fn new(program: &Program, input: Arc<dyn Source>, output: Arc<dyn Sink>) -> Self {
        Self::with_version(program, IsaVersion::Full, input, output)
    }

    /// Creates a machine restricted to the given instruction-set version.
    pub fn with_version(
        program: &Program,
        version: IsaVersion,
        input: Arc<dyn Source>,
        output: Arc<dyn Sink>,
    ) -> Self {
        Self {
            memory: Memory::from_image(program.code()),
            ip: 0,
            relative_base: 0,
            halted: false,
            version,
            input,
            output,
        }
    }

    /// True once the machine has executed HALT.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The machine's memory, for result extraction after a run.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Decodes and executes exactly one instruction.
    ///
    /// Network harnesses use this to interleave machines on one thread when
    /// real parallelism is unnecessary. Stepping a halted machine is fatal.
    pub fn advance_one(&mut self) -> Result<(), VmError> {
        if self.halted {
            return Err(VmError::SteppedAfterHalt);
        }

        let ip = self.ip;
        let (instr, next_ip) = decode(&self.memory, ip, self.version)?;
        let outcome = self.execute(&instr).map_err(|source| VmError::Faulted {
            ip,
            mnemonic: instr.opcode.mnemonic(),
            source: Box::new(source),
        })?;

        match outcome {
            Outcome::Continue => self.ip = next_ip,
            // A negative target is caught by the decoder on the next step.
            Outcome::JumpTo(target) => self.ip = target,
            Outcome::AdjustBase(delta) => {
                self.relative_base += delta;
                self.ip = next_ip;
            }
            Outcome::Halt => {
                self.halted = true;
                self.ip = next_ip;
            }
        }
        Ok(())
    }

    /// Runs until the machine halts.
    pub fn run(&mut self) -> Result<(), VmError> {
        while !self.halted {
            self.advance_one()?;
        }
        Ok(())
    }

    /// Applies one decoded instruction's semantics.
    fn execute(&mut self, instr: &Instruction) -> Result<Outcome, VmError> {
        match instr.opcode {
            Opcode::Add => self.op_binary(instr, |a, b| a.wrapping_add(b)),
            Opcode::Multiply => self.op_binary(instr, |a, b| a.wrapping_mul(b)),
            Opcode::Input => self.op_input(instr),
            Opcode::Output => self.op_output(instr),
            Opcode::JumpIfTrue => self.op_jump(instr, |cond| cond != 0),
            Opcode::JumpIfFalse => self.op_jump(instr, |cond| cond == 0),
            Opcode::LessThan => self.op_binary(instr, |a, b| (a < b) as i64),
            Opcode::Equals => self.op_binary(instr, |a, b| (a == b) as i64),
            Opcode::AdjustBase => self.op_adjust_base(instr),
            Opcode::Halt => Ok(Outcome::Halt),
        }
    }

    fn read_param(&self, instr: &Instruction, index: usize) -> Result<i64, VmError> {
        read_operand(
            instr.modes[index],
            instr.params[index],
            self.relative_base,
            &self.memory,
        )
    }

    fn write_param(&mut self, instr: &Instruction, index: usize, value: i64) -> Result<(), VmError> {
        write_operand(
            instr.modes[index],
            instr.params[index],
            value,
            self.relative_base,
            &mut self.memory,
        )
    }

    /// ADD, MULTIPLY, LESS-THAN, EQUALS: two reads, one write.
    fn op_binary(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<Outcome, VmError> {
        let a = self.read_param(instr, 0)?;
        let b = self.read_param(instr, 1)?;
        self.write_param(instr, 2, op(a, b))?;
        Ok(Outcome::Continue)
    }

    /// JUMP-IF-TRUE / JUMP-IF-FALSE: exact zero test, negatives are "true".
    fn op_jump(
        &mut self,
        instr: &Instruction,
        taken: fn(i64) -> bool,
    ) -> Result<Outcome, VmError> {
        let cond = self.read_param(instr, 0)?;
        let target = self.read_param(instr, 1)?;
        if taken(cond) {
            Ok(Outcome::JumpTo(target))
        } else {
            Ok(Outcome::Continue)
        }
    }

    fn op_input(&mut self, instr: &Instruction) -> Result<Outcome, VmError> {
        let value = self.input.pop()?;
        self.write_param(instr, 0, value)?;
        Ok(Outcome::Continue)
    }

    fn op_output(&mut self, instr: &Instruction) -> Result<Outcome, VmError> {
        let value = self.read_param(instr, 0)?;
        self.output.push(value);
        Ok(Outcome::Continue)
    }

    fn op_adjust_base(&mut self, instr: &Instruction) -> Result<Outcome, VmError> {
        Ok(Outcome::AdjustBase(self.read_param(instr, 0)?))
    }
}

#[cfg(test)]
mod tests;
