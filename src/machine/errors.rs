//! Errors that can occur while parsing or executing a program.

use thiserror::Error;

/// Errors raised by the decoder, the operand resolver, or the run loop.
///
/// Every variant is fatal to the owning machine except [`InputExhausted`],
/// which scripted-input harnesses treat as "the program wants more input
/// than was supplied".
///
/// [`InputExhausted`]: VmError::InputExhausted
#[derive(Debug, Error)]
pub enum VmError {
    /// Encoded cell does not select a known opcode (for the active
    /// instruction-set version).
    #[error("unknown opcode {opcode} at address {addr}")]
    UnknownOpcode { opcode: i64, addr: i64 },
    /// Mode digits left over after assigning one to every parameter, or any
    /// non-zero mode digits on a zero-arity instruction.
    #[error("malformed mode digits in {encoded} at address {addr}")]
    MalformedModes { encoded: i64, addr: i64 },
    /// Mode digit outside the set supported by the active instruction-set
    /// version.
    #[error("invalid parameter mode {digit} at address {addr}")]
    InvalidModeDigit { digit: i64, addr: i64 },
    /// Computed read/write address, or the instruction pointer, is negative.
    #[error("negative address {addr}")]
    InvalidAddress { addr: i64 },
    /// A write-target parameter resolved to immediate mode.
    #[error("immediate mode is not a writable target")]
    ImmediateWrite,
    /// An INPUT popped from a finite scripted source with no values left.
    #[error("input channel exhausted")]
    InputExhausted,
    /// `advance_one` was called on a machine that already halted.
    #[error("machine already halted")]
    SteppedAfterHalt,
    /// Execution-stage failure, annotated with the faulting instruction so
    /// the failure is reproducible from the original program.
    #[error("{mnemonic} at address {ip}: {source}")]
    Faulted {
        ip: i64,
        mnemonic: &'static str,
        source: Box<VmError>,
    },
    /// Program text is not a comma-separated list of signed integers.
    #[error("invalid program token {token:?}")]
    ParseError { token: String },
}

impl VmError {
    /// True if this error is (or wraps) an exhausted input channel.
    ///
    /// Network harnesses use this to tell a deliberately drained script or a
    /// shutdown-closed channel apart from a genuine machine fault.
    pub fn is_input_exhausted(&self) -> bool {
        match self {
            VmError::InputExhausted => true,
            VmError::Faulted { source, .. } => source.is_input_exhausted(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_is_seen_through_fault_wrapper() {
        let wrapped = VmError::Faulted {
            ip: 4,
            mnemonic: "INPUT",
            source: Box::new(VmError::InputExhausted),
        };
        assert!(wrapped.is_input_exhausted());
        assert!(VmError::InputExhausted.is_input_exhausted());
        assert!(!VmError::ImmediateWrite.is_input_exhausted());
    }

    #[test]
    fn fault_wrapper_reports_address_and_instruction() {
        let wrapped = VmError::Faulted {
            ip: 12,
            mnemonic: "ADD",
            source: Box::new(VmError::InvalidAddress { addr: -3 }),
        };
        assert_eq!(
            wrapped.to_string(),
            "ADD at address 12: negative address -3"
        );
    }
}
