//! Blocking FIFO channel, the substrate for all inter-machine communication.
//!
//! `push` appends and never blocks; `pop` suspends on an empty queue until a
//! producer pushes — a condition variable, not a poll loop. Values are
//! delivered to exactly one pop each, in push order. Multiple producers may
//! share one channel; one logical consumer drains it.
//!
//! A finite, pre-scripted source (an interactive driver's command script) can
//! [`close`](Channel::close) the channel instead of blocking its consumer
//! forever: a pop that finds the queue empty and closed reports
//! [`VmError::InputExhausted`]. This is harness policy layered over the same
//! channel type, not a second channel.

use crate::machine::errors::VmError;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// A machine's input end.
pub trait Source: Send + Sync {
    /// Removes and returns the head value, blocking while the queue is empty.
    fn pop(&self) -> Result<i64, VmError>;
}

/// A machine's output end.
pub trait Sink: Send + Sync {
    /// Appends a value; never blocks.
    fn push(&self, value: i64);
}

#[derive(Default)]
struct ChannelState {
    queue: VecDeque<i64>,
    /// Consumers currently blocked inside `pop`.
    waiting: usize,
    closed: bool,
}

/// Unbounded, order-preserving integer queue with a blocking pop.
#[derive(Default)]
pub struct Channel {
    state: Mutex<ChannelState>,
    available: Condvar,
}

impl Channel {
    /// Creates an empty open channel.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates an open channel pre-loaded with `values`.
    pub fn seeded<I: IntoIterator<Item = i64>>(values: I) -> Arc<Self> {
        let channel = Self::new();
        {
            let mut state = channel.lock_state();
            state.queue.extend(values);
        }
        channel
    }

    /// Creates a closed channel holding exactly `values`: a finite script.
    ///
    /// Consumers drain the queued values in order, then observe exhaustion.
    pub fn scripted<I: IntoIterator<Item = i64>>(values: I) -> Arc<Self> {
        let channel = Self::seeded(values);
        channel.close();
        channel
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ChannelState> {
        self.state.lock().expect("channel lock poisoned")
    }

    /// Appends `value` to the tail. Never blocks, never fails.
    pub fn push(&self, value: i64) {
        let mut state = self.lock_state();
        state.queue.push_back(value);
        self.available.notify_one();
    }

    /// Removes and returns the head, suspending while the queue is empty.
    ///
    /// Returns [`VmError::InputExhausted`] once the queue is empty and the
    /// channel has been closed.
    pub fn pop(&self) -> Result<i64, VmError> {
        let mut state = self.lock_state();
        loop {
            if let Some(value) = state.queue.pop_front() {
                return Ok(value);
            }
            if state.closed {
                return Err(VmError::InputExhausted);
            }
            state.waiting += 1;
            state = self
                .available
                .wait(state)
                .expect("channel lock poisoned");
            state.waiting -= 1;
        }
    }

    /// Removes and returns the head without blocking.
    pub fn try_pop(&self) -> Option<i64> {
        self.lock_state().queue.pop_front()
    }

    /// Marks the producing side finished and wakes all blocked consumers.
    ///
    /// Values already queued remain deliverable.
    pub fn close(&self) {
        let mut state = self.lock_state();
        state.closed = true;
        self.available.notify_all();
    }

    /// True if a consumer is currently blocked on an empty queue.
    ///
    /// The star topology's idle monitor samples this; it is a snapshot, not a
    /// synchronization primitive.
    pub fn is_starved(&self) -> bool {
        let state = self.lock_state();
        state.waiting > 0 && state.queue.is_empty()
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.lock_state().queue.len()
    }

    /// True if no values are queued.
    pub fn is_empty(&self) -> bool {
        self.lock_state().queue.is_empty()
    }
}

impl Source for Channel {
    fn pop(&self) -> Result<i64, VmError> {
        Channel::pop(self)
    }
}

impl Sink for Channel {
    fn push(&self, value: i64) {
        Channel::push(self, value)
    }
}
