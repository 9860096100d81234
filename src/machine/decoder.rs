//! Instruction decoding.
//!
//! Splits the encoded cell at the instruction pointer into opcode and
//! per-parameter modes, reads the raw parameters, and returns the decoded
//! instruction together with the advanced pointer.

use crate::machine::errors::VmError;
use crate::machine::isa::{IsaVersion, Opcode};
use crate::machine::memory::Memory;
use crate::machine::operand::Mode;

/// One decoded instruction.
///
/// Created fresh each decode step and discarded after execution; `modes` and
/// `params` both have exactly `opcode.arity()` entries.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: Vec<Mode>,
    /// Raw parameter values exactly as stored on the tape.
    pub params: Vec<i64>,
}

/// Decodes the instruction at `ip`, returning it and the next pointer
/// (`ip + 1 + arity`).
///
/// Fatal on a negative pointer, an opcode unknown to `version`, a mode digit
/// outside `version`'s set, and mode digits beyond the opcode's arity
/// (including any non-zero digits on a zero-arity opcode).
pub fn decode(
    memory: &Memory,
    ip: i64,
    version: IsaVersion,
) -> Result<(Instruction, i64), VmError> {
    let encoded = memory.read(ip)?;
    if encoded < 0 {
        return Err(VmError::UnknownOpcode {
            opcode: encoded,
            addr: ip,
        });
    }

    let opcode = Opcode::lookup(encoded % 100, ip)?;
    if !version.supports(opcode) {
        return Err(VmError::UnknownOpcode {
            opcode: encoded % 100,
            addr: ip,
        });
    }

    let arity = opcode.arity();
    let next_ip = ip + 1 + arity as i64;

    // Mode digits assign least-significant-first to parameters.
    let mut digits = encoded / 100;
    let mut modes = Vec::with_capacity(arity);
    for _ in 0..arity {
        modes.push(Mode::from_digit(digits % 10, version, ip)?);
        digits /= 10;
    }
    if digits != 0 {
        return Err(VmError::MalformedModes { encoded, addr: ip });
    }

    let mut params = Vec::with_capacity(arity);
    for offset in 1..=arity as i64 {
        params.push(memory.read(ip + offset)?);
    }

    Ok((
        Instruction {
            opcode,
            modes,
            params,
        },
        next_ip,
    ))
}
