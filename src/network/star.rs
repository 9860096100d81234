//! Star network of addressed machines with an out-of-band relay.
//!
//! Every node owns a private input channel seeded with its address; its
//! outputs are grouped into `(destination, x, y)` triples and routed straight
//! to the destination node's input, or to the relay for the reserved
//! destination [`RELAY_ADDRESS`]. The relay holds only the most recent pair.
//!
//! The relay's idle monitor is a heuristic over observable blocking state,
//! not an exact distributed-quiescence protocol: when every node has sat
//! blocked on an empty input for enough consecutive observations, the held
//! pair is injected into node 0 and the network resumes. The exact threshold
//! only affects liveness latency, never the eventual result, so it is a
//! tunable with a documented default.

use crate::machine::program::Program;
use crate::machine::vm::Vm;
use crate::network::NetworkError;
use crate::network::channel::{Channel, Sink};
use crate::{error, info, warn};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Reserved destination address handled by the relay instead of a node.
pub const RELAY_ADDRESS: i64 = 255;

/// Consecutive idle observations (one per millisecond tick) before the relay
/// treats the network as quiescent.
pub const DEFAULT_IDLE_THRESHOLD: u32 = 100;

/// Holds the most recent out-of-band packet.
///
/// Node threads deliver concurrently, so the slot is lock-guarded.
#[derive(Default)]
struct Relay {
    held: Mutex<Option<(i64, i64)>>,
}

impl Relay {
    fn deliver(&self, x: i64, y: i64) {
        *self.held.lock().expect("relay lock poisoned") = Some((x, y));
    }

    fn held(&self) -> Option<(i64, i64)> {
        *self.held.lock().expect("relay lock poisoned")
    }
}

/// One node's output end: groups values into triples and routes them.
struct PacketRouter {
    node: i64,
    routes: Arc<DashMap<i64, Arc<Channel>>>,
    relay: Arc<Relay>,
    pending: Mutex<Vec<i64>>,
}

impl Sink for PacketRouter {
    fn push(&self, value: i64) {
        let mut pending = self.pending.lock().expect("router lock poisoned");
        pending.push(value);
        if pending.len() < 3 {
            return;
        }
        let y = pending.pop().expect("triple underflow");
        let x = pending.pop().expect("triple underflow");
        let destination = pending.pop().expect("triple underflow");
        drop(pending);

        if destination == RELAY_ADDRESS {
            self.relay.deliver(x, y);
            return;
        }
        match self.routes.get(&destination) {
            Some(channel) => {
                channel.push(x);
                channel.push(y);
            }
            None => warn!(
                "node {} sent packet to unknown address {}",
                self.node, destination
            ),
        }
    }
}

/// Star topology harness.
pub struct StarNetwork {
    program: Program,
    node_count: usize,
    idle_threshold: u32,
}

impl StarNetwork {
    /// Creates a network of `node_count` copies of `program`, node `i`'s
    /// input seeded with address `i`.
    pub fn new(program: Program, node_count: usize) -> Self {
        Self {
            program,
            node_count,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
        }
    }

    /// Overrides the consecutive-idle threshold.
    ///
    /// Eventual resumption does not depend on the exact value; raising it
    /// trades injection latency for fewer spurious idle calls.
    pub fn idle_threshold(mut self, ticks: u32) -> Self {
        self.idle_threshold = ticks.max(1);
        self
    }

    /// Runs the network until the relay sees the first repeated `y`.
    ///
    /// Node threads are unwound by closing every input channel once the
    /// terminal condition (or a fatal node error) is reached; the resulting
    /// input exhaustion in the nodes is shutdown, not failure.
    pub fn run(&self) -> Result<i64, NetworkError> {
        if self.node_count == 0 {
            return Err(NetworkError::EmptyTopology);
        }

        let routes: Arc<DashMap<i64, Arc<Channel>>> = Arc::new(DashMap::new());
        let relay = Arc::new(Relay::default());
        let inputs: Vec<Arc<Channel>> = (0..self.node_count)
            .map(|address| {
                let channel = Channel::seeded([address as i64]);
                routes.insert(address as i64, channel.clone());
                channel
            })
            .collect();

        let failure: Mutex<Option<NetworkError>> = Mutex::new(None);
        thread::scope(|scope| {
            for (address, input) in inputs.iter().enumerate() {
                let router = Arc::new(PacketRouter {
                    node: address as i64,
                    routes: routes.clone(),
                    relay: relay.clone(),
                    pending: Mutex::new(Vec::with_capacity(3)),
                });
                let mut vm = Vm::new(&self.program, input.clone(), router);
                let failure = &failure;
                scope.spawn(move || {
                    if let Err(source) = vm.run() {
                        if source.is_input_exhausted() {
                            return;
                        }
                        error!("node {} failed: {}", address, source);
                        let mut slot = failure.lock().expect("failure lock poisoned");
                        if slot.is_none() {
                            *slot = Some(NetworkError::Node {
                                id: address,
                                source,
                            });
                        }
                    }
                });
            }

            let result = self.monitor(&inputs, &relay, &failure);
            for input in &inputs {
                input.close();
            }
            result
        })
    }

    /// Idle-monitor loop, run on the driving thread.
    fn monitor(
        &self,
        inputs: &[Arc<Channel>],
        relay: &Relay,
        failure: &Mutex<Option<NetworkError>>,
    ) -> Result<i64, NetworkError> {
        let mut consecutive_idle = 0u32;
        let mut injected: Vec<i64> = Vec::new();
        loop {
            if let Some(err) = failure.lock().expect("failure lock poisoned").take() {
                return Err(err);
            }

            if inputs.iter().all(|channel| channel.is_starved()) {
                consecutive_idle += 1;
            } else {
                consecutive_idle = 0;
            }

            if consecutive_idle >= self.idle_threshold {
                consecutive_idle = 0;
                let (x, y) = relay.held().ok_or(NetworkError::RelayEmpty)?;
                if injected.contains(&y) {
                    info!("relay saw repeated y = {}, network is steady", y);
                    return Ok(y);
                }
                info!("network idle, relay injecting ({}, {}) into node 0", x, y);
                injected.push(y);
                inputs[0].push(x);
                inputs[0].push(y);
            }

            thread::sleep(Duration::from_millis(1));
        }
    }
}
