use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use lrc_logging::{lrc_error, lrc_warn};

use crate::{PipelineEvent, ProgressSink, WorkItem};

/// Runs a collaborator call, turning a panic into `None` so the item can
/// still be forwarded and counted.
pub(crate) fn guarded<T>(worker: &str, item: &WorkItem, call: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(value) => Some(value),
        Err(payload) => {
            lrc_error!(
                "{worker}: collaborator panicked on '{item}': {}",
                panic_message(payload.as_ref())
            );
            None
        }
    }
}

/// Delivers one event; a panicking sink loses the event, never the run.
pub(crate) fn emit_guarded(progress: &dyn ProgressSink, event: PipelineEvent) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| progress.emit(event))) {
        lrc_warn!(
            "progress sink panicked, event dropped: {}",
            panic_message(payload.as_ref())
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}
