//! Linear pipeline of machines.
//!
//! Each machine is fed by its predecessor's output; no cycle exists, so no
//! machine ever blocks on a value its predecessor has not fully produced, and
//! running each to completion in sequence on the driving thread suffices.

use crate::info;
use crate::machine::program::Program;
use crate::machine::vm::Vm;
use crate::network::NetworkError;
use crate::network::channel::Channel;

/// Runs `params.len()` copies of `program` in a chain.
///
/// Machine `i` reads its predecessor's output channel, pre-seeded with
/// `params[i]`; the first channel additionally carries the driving value
/// `seed`. Each input is closed before its machine runs — everything the
/// machine may consume is already queued, so a program demanding more input
/// than the chain delivers exhausts instead of deadlocking the driving
/// thread. Returns the final value on the last machine's output channel; an
/// empty `params` returns `seed` unchanged.
pub fn run_pipeline(program: &Program, params: &[i64], seed: i64) -> Result<i64, NetworkError> {
    if params.is_empty() {
        return Ok(seed);
    }

    let mut channels: Vec<_> = params.iter().map(|&p| Channel::seeded([p])).collect();
    channels.push(Channel::new());
    channels[0].push(seed);

    for id in 0..params.len() {
        let input = channels[id].clone();
        let output = channels[id + 1].clone();
        input.close();
        let mut vm = Vm::new(program, input, output);
        vm.run().map_err(|source| NetworkError::Node { id, source })?;
    }

    let mut signal = None;
    while let Some(value) = channels[params.len()].try_pop() {
        signal = Some(value);
    }
    let signal = signal.ok_or(NetworkError::NoOutput {
        id: params.len() - 1,
    })?;
    info!("pipeline of {} nodes produced {}", params.len(), signal);
    Ok(signal)
}
