//! Network harnesses: wiring machines and channels into topologies.
//!
//! - [`channel`]: The blocking FIFO queue and the machine I/O traits
//! - [`pipeline`]: Linear chain of machines run sequentially to completion
//! - [`ring`]: Feedback ring, one thread per machine
//! - [`star`]: Addressed nodes, a packet router, and the idle-monitoring relay
//!
//! Memory and execution state stay exclusively owned by one machine; channels
//! are the only shared mutable resource, and the only blocking primitive is a
//! channel pop on an empty queue.

pub mod channel;
pub mod pipeline;
pub mod ring;
pub mod star;

use crate::machine::errors::VmError;
use thiserror::Error;

/// Errors surfaced by a network harness.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A machine failed; `id` is its position within the topology.
    #[error("node {id}: {source}")]
    Node { id: usize, source: VmError },
    /// A machine halted without producing the output its topology consumes.
    #[error("node {id} halted without producing output")]
    NoOutput { id: usize },
    /// The topology was built with zero machines.
    #[error("topology has no nodes")]
    EmptyTopology,
    /// The relay was asked to inject before any packet reached it.
    #[error("relay has no packet to inject")]
    RelayEmpty,
}
