use lrc_logging::{lrc_debug, lrc_info};

use crate::{Counters, WorkItem, WorkQueue};

/// Hands every item to the fetch queue in order, then marks feeding complete.
pub(crate) fn run_feeder(
    items: Vec<WorkItem>,
    fetch_queue: &WorkQueue<WorkItem>,
    counters: &Counters,
) {
    lrc_info!("feeder: queueing {} songs", items.len());
    for item in items {
        counters.record_queued();
        lrc_debug!("feeder: queued '{item}'");
        fetch_queue.put(item);
    }
    counters.finish_feeding();
    lrc_info!("feeder: done, {} songs queued", counters.snapshot().queued);
}
