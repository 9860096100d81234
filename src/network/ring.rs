//! Feedback ring of machines.
//!
//! The last machine's output feeds back into the first machine's input, so a
//! machine may suspend mid-run waiting for a value its successor has not yet
//! produced. Each machine therefore runs on its own thread; blocking one
//! never blocks the harness.

use crate::machine::errors::VmError;
use crate::machine::program::Program;
use crate::machine::vm::Vm;
use crate::network::NetworkError;
use crate::network::channel::Channel;
use crate::{error, info};
use std::sync::Arc;
use std::thread;

/// Runs `params.len()` copies of `program` in a feedback ring.
///
/// Channel `i` feeds machine `i` and receives machine `i-1`'s output; it is
/// seeded with `params[i]`, and channel 0 additionally with the driving value
/// `0`. Every machine closes its output channel when it stops, so one
/// machine's fatal error surfaces in its consumers as input exhaustion
/// instead of a silent deadlock. Returns the final value delivered back to
/// channel 0 after every machine halts.
pub fn run_ring(program: &Program, params: &[i64]) -> Result<i64, NetworkError> {
    if params.is_empty() {
        return Err(NetworkError::EmptyTopology);
    }

    let channels: Vec<Arc<Channel>> = params.iter().map(|&p| Channel::seeded([p])).collect();
    channels[0].push(0);

    let node_count = params.len();
    let results: Vec<Result<(), VmError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..node_count)
            .map(|id| {
                let input = channels[id].clone();
                let output = channels[(id + 1) % node_count].clone();
                scope.spawn(move || {
                    let mut vm = Vm::new(program, input, output.clone());
                    let result = vm.run();
                    output.close();
                    result
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("ring thread panicked"))
            .collect()
    });

    // Exhaustion in one machine is the downstream shadow of another
    // machine's failure (or of its predecessor halting); report the root.
    let mut first_exhausted = None;
    for (id, result) in results.into_iter().enumerate() {
        if let Err(source) = result {
            if source.is_input_exhausted() {
                first_exhausted.get_or_insert((id, source));
            } else {
                error!("ring node {} failed: {}", id, source);
                return Err(NetworkError::Node { id, source });
            }
        }
    }
    if let Some((id, source)) = first_exhausted {
        return Err(NetworkError::Node { id, source });
    }

    let mut last = None;
    while let Some(value) = channels[0].try_pop() {
        last = Some(value);
    }
    let result = last.ok_or(NetworkError::NoOutput { id: node_count - 1 })?;
    info!("ring of {} nodes settled at {}", node_count, result);
    Ok(result)
}
