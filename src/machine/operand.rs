//! Parameter mode resolution.
//!
//! Given a mode and a raw parameter as stored on the tape, computes the
//! effective value (for reads) or effective address (for writes) against
//! memory and the machine's relative base.

use crate::machine::errors::VmError;
use crate::machine::isa::IsaVersion;
use crate::machine::memory::Memory;

/// Addressing mode of one parameter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// The parameter is an address.
    Position,
    /// The parameter is the value itself.
    Immediate,
    /// The parameter is an offset from the relative base.
    Relative,
}

impl Mode {
    /// Decodes one mode digit, honouring the active instruction-set version.
    ///
    /// `addr` is only used for error context.
    pub fn from_digit(digit: i64, version: IsaVersion, addr: i64) -> Result<Self, VmError> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 if version == IsaVersion::Full => Ok(Mode::Relative),
            _ => Err(VmError::InvalidModeDigit { digit, addr }),
        }
    }
}

/// Resolves a parameter read to its effective value.
pub fn read_operand(
    mode: Mode,
    raw: i64,
    relative_base: i64,
    memory: &Memory,
) -> Result<i64, VmError> {
    match mode {
        Mode::Position => memory.read(raw),
        Mode::Immediate => Ok(raw),
        Mode::Relative => memory.read(relative_base + raw),
    }
}

/// Resolves a write-target parameter and stores `value` there.
///
/// Immediate mode is never a legal write target.
pub fn write_operand(
    mode: Mode,
    raw: i64,
    value: i64,
    relative_base: i64,
    memory: &mut Memory,
) -> Result<(), VmError> {
    match mode {
        Mode::Position => memory.write(raw, value),
        Mode::Immediate => Err(VmError::ImmediateWrite),
        Mode::Relative => memory.write(relative_base + raw, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_each_mode() {
        let mem = Memory::from_image(&[10, 20, 30]);
        assert_eq!(read_operand(Mode::Position, 2, 0, &mem).unwrap(), 30);
        assert_eq!(read_operand(Mode::Immediate, -5, 0, &mem).unwrap(), -5);
        assert_eq!(read_operand(Mode::Relative, -1, 2, &mem).unwrap(), 20);
    }

    #[test]
    fn write_position_and_relative() {
        let mut mem = Memory::from_image(&[0, 0, 0]);
        write_operand(Mode::Position, 1, 7, 0, &mut mem).unwrap();
        write_operand(Mode::Relative, 1, 8, 1, &mut mem).unwrap();
        assert_eq!(mem.dump(3), vec![0, 7, 8]);
    }

    #[test]
    fn immediate_write_is_fatal() {
        let mut mem = Memory::from_image(&[0]);
        assert!(matches!(
            write_operand(Mode::Immediate, 0, 1, 0, &mut mem),
            Err(VmError::ImmediateWrite)
        ));
    }

    #[test]
    fn negative_effective_address_is_fatal() {
        let mem = Memory::from_image(&[0]);
        assert!(matches!(
            read_operand(Mode::Relative, -3, 1, &mem),
            Err(VmError::InvalidAddress { addr: -2 })
        ));
    }

    #[test]
    fn relative_digit_rejected_on_basic_isa() {
        assert!(Mode::from_digit(2, IsaVersion::Full, 0).is_ok());
        assert!(matches!(
            Mode::from_digit(2, IsaVersion::Basic, 6),
            Err(VmError::InvalidModeDigit { digit: 2, addr: 6 })
        ));
        assert!(matches!(
            Mode::from_digit(3, IsaVersion::Full, 0),
            Err(VmError::InvalidModeDigit { digit: 3, .. })
        ));
    }
}
