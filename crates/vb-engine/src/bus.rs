//! Engine message bus
//!
//! Messages are posted from any thread and delivered to the registered
//! listener on the engine thread, in posting order.

use crate::engine::MessageListener;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;
use vb_core::{MessageEvent, MsgType};

/// Maximum number of undelivered messages kept by the bus
pub const BUS_QUEUE_CAPACITY: usize = 512;

struct BusState {
    queue: VecDeque<MessageEvent>,
    listener: Option<Arc<dyn Fn(MessageEvent) + Send + Sync>>,
    /// Wake-up requested by a lifecycle change
    signaled: bool,
}

/// Message queue plus listener registration
pub struct MessageBus {
    state: Mutex<BusState>,
    condvar: Condvar,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState {
                queue: VecDeque::with_capacity(BUS_QUEUE_CAPACITY),
                listener: None,
                signaled: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Queue a message for delivery
    pub fn post(&self, kind: MsgType, data1: i32, data2: i32, data3: i32, data4: i32) {
        self.post_event(MessageEvent::new(kind, data1, data2, data3, data4));
    }

    pub fn post_event(&self, event: MessageEvent) {
        let mut state = self.state.lock();
        if state.queue.len() == BUS_QUEUE_CAPACITY {
            state.queue.pop_front();
        }
        trace!("Posting {}", event);
        state.queue.push_back(event);
        self.condvar.notify_one();
    }

    pub fn set_listener(&self, listener: MessageListener) {
        self.state.lock().listener = Some(Arc::from(listener));
    }

    pub fn clear_listener(&self) {
        self.state.lock().listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    /// Number of undelivered messages
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Wake up a thread blocked in [`wait_until`](Self::wait_until)
    pub fn signal(&self) {
        self.state.lock().signaled = true;
        self.condvar.notify_all();
    }

    /// Block until `deadline`, a posted message or a signal
    pub fn wait_until(&self, deadline: Instant) {
        let mut state = self.state.lock();
        while state.queue.is_empty() && !state.signaled {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.signaled = false;
    }

    /// Deliver all queued messages to the listener
    ///
    /// The listener runs without the bus lock held. Messages posted while no
    /// listener is registered are discarded.
    pub fn flush(&self) -> usize {
        let (events, listener) = {
            let mut state = self.state.lock();
            let events: Vec<MessageEvent> = state.queue.drain(..).collect();
            (events, state.listener.clone())
        };

        let Some(listener) = listener else {
            return 0;
        };
        for event in &events {
            listener(*event);
        }
        events.len()
    }
}
