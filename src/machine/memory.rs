//! Sparse, zero-default integer memory.
//!
//! One abstraction for every instruction-set version: an address-to-value map
//! where reading a never-written cell yields zero and addresses are logically
//! unbounded. Negative addresses are fatal at the moment of access.

use crate::machine::errors::VmError;
use std::collections::HashMap;

/// Sparse mapping from non-negative address to signed integer value.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    cells: HashMap<i64, i64>,
}

impl Memory {
    /// Creates a memory whose low addresses hold a copy of `image`.
    pub fn from_image(image: &[i64]) -> Self {
        let cells = image
            .iter()
            .enumerate()
            .map(|(addr, &value)| (addr as i64, value))
            .collect();
        Self { cells }
    }

    /// Reads the value at `addr`; never-written cells read as zero.
    pub fn read(&self, addr: i64) -> Result<i64, VmError> {
        if addr < 0 {
            return Err(VmError::InvalidAddress { addr });
        }
        Ok(self.cells.get(&addr).copied().unwrap_or(0))
    }

    /// Writes `value` at `addr`.
    pub fn write(&mut self, addr: i64, value: i64) -> Result<(), VmError> {
        if addr < 0 {
            return Err(VmError::InvalidAddress { addr });
        }
        self.cells.insert(addr, value);
        Ok(())
    }

    /// Returns the first `len` cells as a dense vector.
    ///
    /// Used to compare a final memory against an expected image.
    pub fn dump(&self, len: usize) -> Vec<i64> {
        (0..len as i64)
            .map(|addr| self.cells.get(&addr).copied().unwrap_or(0))
            .collect()
    }
}
