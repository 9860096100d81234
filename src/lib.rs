//! Intcode virtual machine library.
//!
//! Provides a stack-free virtual machine over a linear tape of signed
//! integers, the blocking FIFO channel that connects machine instances, and
//! harnesses that wire several machines into communicating networks.

pub mod machine;
pub mod network;
pub mod utils;
