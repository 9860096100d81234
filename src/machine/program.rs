//! Immutable program image and text parsing.
//!
//! The on-disk representation is a single line of comma-separated base-10
//! signed integers. A `Program` is immutable once loaded; every machine
//! execution clones it into its own memory, so re-running a program never
//! observes another run's mutations.

use crate::machine::errors::VmError;
use std::str::FromStr;

/// Ordered initial memory image of a machine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program {
    code: Vec<i64>,
}

impl Program {
    /// Creates a program from an already-parsed image.
    pub fn new(code: Vec<i64>) -> Self {
        Self { code }
    }

    /// Parses the comma-separated text format.
    ///
    /// Surrounding whitespace (including the trailing newline of a program
    /// file) is tolerated; anything that is not a signed decimal integer is a
    /// [`VmError::ParseError`] naming the offending token.
    pub fn parse(text: &str) -> Result<Self, VmError> {
        let code = text
            .trim()
            .split(',')
            .map(|token| {
                token.trim().parse::<i64>().map_err(|_| VmError::ParseError {
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<i64>, VmError>>()?;
        Ok(Self { code })
    }

    /// The initial memory image.
    pub fn code(&self) -> &[i64] {
        &self.code
    }

    /// Number of cells in the image.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// True if the image holds no cells.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl FromStr for Program {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
