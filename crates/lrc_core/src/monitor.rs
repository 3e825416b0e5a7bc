use std::fmt;
use std::time::{Duration, Instant};

use lrc_logging::{lrc_debug, lrc_info};

use crate::guard::emit_guarded;

use crate::{
    CounterSnapshot, Counters, Extracted, Fetched, RunSummary, ShutdownSignal, SupervisorState,
    WorkItem, WorkQueue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub fetch_queue: usize,
    pub extract_queue: usize,
    pub sink_queue: usize,
    pub counters: CounterSnapshot,
    pub elapsed: Duration,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:<4} s] song queue:{:<8} page queue:{:<8} lyric queue:{:<8} queued:{:<8} processed:{:<8} found:{}",
            self.elapsed.as_secs(),
            self.fetch_queue,
            self.extract_queue,
            self.sink_queue,
            self.counters.queued,
            self.counters.processed_total,
            self.counters.processed_ok,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StateChanged(SupervisorState),
    Progress(ProgressSnapshot),
    Finished(RunSummary),
}

/// Observability sink for pipeline events. Must not block. A panic in `emit`
/// is logged and the event dropped.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Writes every event to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StateChanged(state) => lrc_info!("pipeline state: {state:?}"),
            PipelineEvent::Progress(snapshot) => lrc_info!("{snapshot}"),
            PipelineEvent::Finished(summary) => lrc_info!("pipeline finished: {summary}"),
        }
    }
}

/// Forwards events over a channel; a disconnected receiver is ignored.
pub struct ChannelProgressSink {
    tx: crossbeam_channel::Sender<PipelineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: crossbeam_channel::Sender<PipelineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The three hand-off queues of one pipeline run.
#[derive(Clone, Default)]
pub(crate) struct QueueSet {
    pub fetch: WorkQueue<WorkItem>,
    pub extract: WorkQueue<Fetched>,
    pub sink: WorkQueue<Extracted>,
}

impl QueueSet {
    pub fn sample(&self, counters: &Counters, started: Instant) -> ProgressSnapshot {
        ProgressSnapshot {
            fetch_queue: self.fetch.size(),
            extract_queue: self.extract.size(),
            sink_queue: self.sink.size(),
            counters: counters.snapshot(),
            elapsed: started.elapsed(),
        }
    }
}

pub(crate) fn run_monitor(
    interval: Duration,
    queues: &QueueSet,
    counters: &Counters,
    started: Instant,
    progress: &dyn ProgressSink,
    shutdown: &ShutdownSignal,
) {
    while !shutdown.wait_timeout(interval) {
        emit_guarded(progress, PipelineEvent::Progress(queues.sample(counters, started)));
    }
    lrc_debug!("monitor: stopped");
}
