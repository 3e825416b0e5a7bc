use std::io;

use crossbeam_channel::Receiver;
use lrc_logging::{lrc_debug, lrc_error, lrc_info, lrc_warn};

use crate::guard::guarded;
use crate::{Counters, Extracted, ShutdownSignal, WorkItem, WorkQueue};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Other(String),
}

/// The output store. Owned by the sink writer thread alone.
pub trait LyricSink: Send {
    fn append(&mut self, item: &WorkItem, lyric: &str) -> Result<(), SinkError>;

    /// Called once after the last append, and only when the run drained.
    /// A store that is dropped without `finish` must leave prior output alone.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// The single writer. The only place the processed counters are updated.
///
/// After shutdown the writer waits for the supervisor's verdict: `true`
/// commits the store, `false` or a dropped sender discards it unfinished.
pub(crate) fn run_sink_writer(
    mut sink: Box<dyn LyricSink>,
    input: &WorkQueue<Extracted>,
    counters: &Counters,
    shutdown: &ShutdownSignal,
    commit: &Receiver<bool>,
) -> Result<(), SinkError> {
    lrc_info!("sink: started");
    while let Some(Extracted { item, lyric }) = input.get(shutdown) {
        let found = match lyric.as_deref() {
            Some(text) if !text.is_empty() => {
                match guarded("sink", &item, || sink.append(&item, text)) {
                    Some(Ok(())) => {
                        lrc_debug!("sink: wrote lyric for '{item}'");
                        true
                    }
                    Some(Err(err)) => {
                        lrc_error!("sink: failed to write lyric for '{item}': {err}");
                        false
                    }
                    None => false,
                }
            }
            _ => false,
        };
        counters.record_processed(found);
    }
    if commit.recv().unwrap_or(false) {
        lrc_debug!("sink: finishing output");
        sink.finish()
    } else {
        lrc_warn!("sink: run did not complete, output discarded");
        Ok(())
    }
}
