//! Lyric spider core: the concurrent fetch / extract / sink pipeline.
//!
//! Stages talk only through [`WorkQueue`]s. Network and markup work happen
//! behind the [`Fetcher`] and [`Extractor`] traits; persistence behind
//! [`LyricSink`].
mod counters;
mod extract;
mod feeder;
mod fetch;
mod guard;
mod monitor;
mod queue;
mod sink;
mod supervisor;
mod types;

pub use counters::{CounterSnapshot, Counters};
pub use extract::Extractor;
pub use fetch::Fetcher;
pub use monitor::{
    ChannelProgressSink, LogProgressSink, PipelineEvent, ProgressSink, ProgressSnapshot,
};
pub use queue::{shutdown_channel, ShutdownSignal, ShutdownTrigger, WorkQueue};
pub use sink::{LyricSink, SinkError};
pub use supervisor::{PipelineConfig, PipelineError, RunSummary, Supervisor, SupervisorState};
pub use types::{Extracted, FailureKind, FetchError, Fetched, WorkItem};
