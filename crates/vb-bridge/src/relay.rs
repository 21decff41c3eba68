//! Event relay
//!
//! Hands engine messages from the engine thread to the host thread through
//! a single FIFO channel. The engine-side listener only enqueues.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};
use vb_core::MessageEvent;
use vb_engine::MessageListener;

pub struct EventRelay {
    sender: Sender<MessageEvent>,
    receiver: Receiver<MessageEvent>,
    dropped: Arc<AtomicU64>,
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EventRelay {
    /// Create a relay; `capacity == 0` means unbounded
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = if capacity == 0 {
            channel::unbounded()
        } else {
            channel::bounded(capacity)
        };
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Callback to register with the engine's message bus
    ///
    /// Never blocks. Events arriving at a full bounded queue are dropped.
    pub fn listener(&self) -> MessageListener {
        let sender = self.sender.clone();
        let dropped = Arc::clone(&self.dropped);
        Box::new(move |event: MessageEvent| match sender.try_send(event) {
            Ok(()) => trace!("Relaying {}", event),
            Err(TrySendError::Full(event)) => {
                let total = dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Event queue full, dropped {} ({} total)", event, total);
            }
            Err(TrySendError::Disconnected(_)) => {}
        })
    }

    pub fn poll(&self) -> Option<MessageEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<MessageEvent> {
        self.receiver.try_iter().collect()
    }

    /// Pass every queued event to `handler`, returning how many were handled
    pub fn dispatch<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(MessageEvent),
    {
        let mut count = 0;
        while let Some(event) = self.poll() {
            handler(event);
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<MessageEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Events lost to a full queue
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::MsgType;

    #[test]
    fn test_fifo_order() {
        let relay = EventRelay::default();
        let listener = relay.listener();
        listener(MessageEvent::with_value(MsgType::PowerOn, 0));
        listener(MessageEvent::with_value(MsgType::DiskInsert, 1));
        listener(MessageEvent::with_value(MsgType::Run, 0));

        assert_eq!(relay.pending(), 3);
        let kinds: Vec<_> = relay.drain().iter().filter_map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![MsgType::PowerOn, MsgType::DiskInsert, MsgType::Run]);
        assert_eq!(relay.poll(), None);
    }

    #[test]
    fn test_bounded_drops() {
        let relay = EventRelay::new(2);
        let listener = relay.listener();
        for drive in 0..5 {
            listener(MessageEvent::with_value(MsgType::DiskEject, drive));
        }
        assert_eq!(relay.pending(), 2);
        assert_eq!(relay.dropped(), 3);

        let mut drives = Vec::new();
        assert_eq!(relay.dispatch(|e| drives.push(e.data1)), 2);
        assert_eq!(drives, vec![0, 1]);
    }

    #[test]
    fn test_cross_thread() {
        let relay = EventRelay::default();
        let listener = relay.listener();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                listener(MessageEvent::with_value(MsgType::Config, i));
            }
        });

        let mut received = Vec::new();
        while received.len() < 100 {
            match relay.recv_timeout(Duration::from_secs(5)) {
                Some(event) => received.push(event.data1),
                None => break,
            }
        }
        handle.join().unwrap();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }
}
