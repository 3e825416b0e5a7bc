//! Hand-off queues between pipeline stages and the shutdown signal that
//! releases workers blocked on them.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

/// Unbounded multi-producer, multi-consumer FIFO.
///
/// Every clone refers to the same queue. The queue keeps one sender and one
/// receiver of its own, so the underlying channel can never disconnect and
/// `put` can never fail.
pub struct WorkQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Appends an item, waking one blocked getter if there is one.
    pub fn put(&self, item: T) {
        // Cannot fail: `self.rx` keeps the channel connected.
        let _ = self.tx.send(item);
    }

    /// Blocks until an item is available and removes it.
    ///
    /// Returns `None` only once `shutdown` has been triggered.
    pub fn get(&self, shutdown: &ShutdownSignal) -> Option<T> {
        crossbeam_channel::select! {
            recv(self.rx) -> item => item.ok(),
            recv(shutdown.rx) -> _ => None,
        }
    }

    /// Removes an item if one is pending, without blocking.
    pub fn try_get(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Best-effort count of pending items. For monitoring only.
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a connected trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = crossbeam_channel::bounded(0);
    (ShutdownTrigger { _tx: tx }, ShutdownSignal { rx })
}

/// Owned by the supervisor. Dropping or triggering it fires every signal.
pub struct ShutdownTrigger {
    _tx: Sender<()>,
}

impl ShutdownTrigger {
    pub fn trigger(self) {}
}

/// Cloneable view of the shutdown state handed to every worker.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleeps for up to `timeout`; returns `true` as soon as shutdown fires.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.rx.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }
}
