//! Stack-free virtual machine over a linear tape of signed integers.
//!
//! The machine executes a `Program` cloned into its own sparse [`memory`],
//! decoding one instruction at a time at the instruction pointer and applying
//! its semantics until it halts. All I/O happens through the channel traits in
//! [`crate::network::channel`]; an `INPUT` on an empty channel is the
//! machine's only suspension point.
//!
//! # Instruction format
//!
//! Each encoded cell is `modes * 100 + opcode`. The two low decimal digits
//! select the opcode; the remaining digits, read least-significant-first,
//! give each parameter's addressing mode (position, immediate, or relative).
//!
//! # Modules
//!
//! - [`decoder`]: Splits an encoded cell into opcode, modes, and parameters
//! - [`errors`]: Execution and parse error types
//! - [`isa`]: Opcode table, arities, and instruction-set versioning
//! - [`memory`]: Sparse zero-default integer memory
//! - [`operand`]: Parameter mode resolution for reads and writes
//! - [`program`]: Immutable program image and text parsing
//! - [`vm`]: The run loop and per-instruction execution

pub mod decoder;
pub mod errors;
pub mod isa;
pub mod memory;
pub mod operand;
pub mod program;
pub mod vm;
