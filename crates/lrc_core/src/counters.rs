use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Completion accounting shared by every stage.
///
/// Write order keeps `processed_ok <= processed_total <= queued` true at
/// every instant: `queued` is bumped before an item enters the fetch queue
/// and `processed_total` before `processed_ok`. `snapshot` reads in the
/// reverse order so no snapshot can observe a violation.
#[derive(Debug, Default)]
pub struct Counters {
    queued: AtomicU64,
    processed_total: AtomicU64,
    processed_ok: AtomicU64,
    feeding_done: AtomicBool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub queued: u64,
    pub processed_total: u64,
    pub processed_ok: u64,
}

impl CounterSnapshot {
    pub fn not_found(&self) -> u64 {
        self.processed_total - self.processed_ok
    }

    pub fn is_consistent(&self) -> bool {
        self.processed_ok <= self.processed_total && self.processed_total <= self.queued
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queued={} processed={} found={}",
            self.queued, self.processed_total, self.processed_ok
        )
    }
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the feeder before the item is put on the fetch queue.
    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::SeqCst);
    }

    /// Called by the sink writer once per item, found or not.
    pub fn record_processed(&self, found: bool) {
        self.processed_total.fetch_add(1, Ordering::SeqCst);
        if found {
            self.processed_ok.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Set-once: `queued` is final after this.
    pub fn finish_feeding(&self) {
        self.feeding_done.store(true, Ordering::SeqCst);
    }

    pub fn is_feeding_done(&self) -> bool {
        self.feeding_done.load(Ordering::SeqCst)
    }

    /// True once feeding is complete and every queued item has been processed.
    pub fn is_drained(&self) -> bool {
        if !self.is_feeding_done() {
            return false;
        }
        let queued = self.queued.load(Ordering::SeqCst);
        self.processed_total.load(Ordering::SeqCst) == queued
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let processed_ok = self.processed_ok.load(Ordering::SeqCst);
        let processed_total = self.processed_total.load(Ordering::SeqCst);
        let queued = self.queued.load(Ordering::SeqCst);
        CounterSnapshot {
            queued,
            processed_total,
            processed_ok,
        }
    }
}
