//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode table and invokes a callback macro for code generation, so the
//! decoder, the executor, and the tests all draw from one definition instead
//! of re-declaring the dispatch table per use site.
//!
//! Networks that predate the relative addressing extension run with
//! [`IsaVersion::Basic`], which rejects `ADJUST_BASE` and relative-mode
//! parameters at decode time.

use crate::machine::errors::VmError;

/// Invokes a callback macro with the complete opcode definition list.
///
/// Each entry is `Name = opcode, "MNEMONIC", arity`.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// ADD a, b, dst ; dst = a + b
            Add = 1, "ADD", 3,
            /// MULTIPLY a, b, dst ; dst = a * b
            Multiply = 2, "MULTIPLY", 3,
            /// INPUT dst ; dst = next value from the input channel (blocking)
            Input = 3, "INPUT", 1,
            /// OUTPUT src ; push src onto the output channel
            Output = 4, "OUTPUT", 1,
            /// JUMP-IF-TRUE cond, target ; if cond != 0 then ip = target
            JumpIfTrue = 5, "JUMP-IF-TRUE", 2,
            /// JUMP-IF-FALSE cond, target ; if cond == 0 then ip = target
            JumpIfFalse = 6, "JUMP-IF-FALSE", 2,
            /// LESS-THAN a, b, dst ; dst = 1 if a < b else 0
            LessThan = 7, "LESS-THAN", 3,
            /// EQUALS a, b, dst ; dst = 1 if a == b else 0
            Equals = 8, "EQUALS", 3,
            /// ADJUST_BASE delta ; relative base += delta
            AdjustBase = 9, "ADJUST_BASE", 1,
            /// HALT ; terminate the machine
            Halt = 99, "HALT", 0,
        }
    };
}

macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:expr, $mnemonic:literal, $arity:expr
        ),* $(,)?
    ) => {
        /// One decoded opcode.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl Opcode {
            /// Decodes the low two digits of an encoded instruction cell.
            ///
            /// `addr` is only used for error context.
            pub fn lookup(value: i64, addr: i64) -> Result<Self, VmError> {
                match value {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(VmError::UnknownOpcode {
                        opcode: value,
                        addr,
                    }),
                }
            }

            /// Returns the mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns the fixed parameter count for this opcode.
            pub const fn arity(&self) -> usize {
                match self {
                    $( Opcode::$name => $arity, )*
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

/// Instruction-set version in use for one machine.
///
/// Selects which opcodes and parameter modes the shared decoder accepts, so
/// topologies that only need the smaller instruction set get malformed-program
/// detection for the extensions instead of silently executing them.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum IsaVersion {
    /// Position and immediate parameter modes only; `ADJUST_BASE` is not a
    /// known opcode.
    Basic,
    /// Adds the relative parameter mode and `ADJUST_BASE`.
    #[default]
    Full,
}

impl IsaVersion {
    /// True if `opcode` is part of this instruction-set version.
    pub const fn supports(self, opcode: Opcode) -> bool {
        match self {
            IsaVersion::Basic => !matches!(opcode, Opcode::AdjustBase),
            IsaVersion::Full => true,
        }
    }
}
