use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use lrc_logging::{lrc_error, lrc_info};

use crate::extract::run_extract_worker;
use crate::feeder::run_feeder;
use crate::fetch::run_fetch_worker;
use crate::guard::emit_guarded;
use crate::monitor::{run_monitor, QueueSet};
use crate::queue::{shutdown_channel, ShutdownSignal};
use crate::sink::run_sink_writer;
use crate::{
    CounterSnapshot, Counters, Extractor, Fetcher, LogProgressSink, LyricSink, PipelineEvent,
    ProgressSink, SinkError, WorkItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Feeding,
    Draining,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub fetch_workers: usize,
    pub extract_workers: usize,
    pub monitor_interval: Duration,
    pub poll_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_workers: 8,
            extract_workers: 8,
            monitor_interval: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.fetch_workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "fetch worker count must be at least 1".into(),
            ));
        }
        if self.extract_workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "extract worker count must be at least 1".into(),
            ));
        }
        if self.monitor_interval.is_zero() || self.poll_interval.is_zero() {
            return Err(PipelineError::InvalidConfig(
                "monitor and poll intervals must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub counters: CounterSnapshot,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not_found={} elapsed={:.1}s",
            self.counters,
            self.counters.not_found(),
            self.elapsed.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn worker thread {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("worker thread {0} exited before shutdown")]
    WorkerExited(String),
    #[error("output store failed: {0}")]
    Sink(#[from] SinkError),
}

/// Runs one pipeline to completion.
///
/// `run` launches every worker, polls until the feeder has finished and every
/// queued song has reached the sink writer, then shuts the workers down and
/// joins them.
///
/// The store is finished only after a clean drain. On any error it is
/// dropped unfinished.
pub struct Supervisor {
    config: PipelineConfig,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    progress: Arc<dyn ProgressSink>,
}

impl Supervisor {
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            progress: Arc::new(LogProgressSink),
        }
    }

    pub fn with_progress_sink(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(
        &self,
        items: Vec<WorkItem>,
        store: Box<dyn LyricSink>,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        self.enter(SupervisorState::Starting);
        self.config.validate()?;

        let counters = Arc::new(Counters::new());
        let queues = QueueSet::default();
        let (trigger, shutdown) = shutdown_channel();
        let (commit, commit_rx) = crossbeam_channel::bounded(1);
        let mut workers = Workers::default();

        let launched = self.launch(
            &mut workers,
            items,
            (store, commit_rx),
            &queues,
            &counters,
            &shutdown,
            started,
        );
        if let Err(err) = launched {
            drop(commit);
            trigger.trigger();
            let _ = workers.join();
            return Err(err);
        }

        self.enter(SupervisorState::Feeding);
        let drained = self.wait_for_drain(&workers, &counters);
        if drained.is_ok() {
            self.enter(SupervisorState::Done);
        }

        // The sink only commits the store on `true`.
        let _ = commit.send(drained.is_ok());
        trigger.trigger();
        let joined = workers.join();
        drained?;
        joined?;

        let summary = RunSummary {
            counters: counters.snapshot(),
            elapsed: started.elapsed(),
        };
        let progress = self.progress.as_ref();
        emit_guarded(
            progress,
            PipelineEvent::Progress(queues.sample(&counters, started)),
        );
        emit_guarded(progress, PipelineEvent::Finished(summary));
        Ok(summary)
    }

    fn enter(&self, state: SupervisorState) {
        lrc_info!("supervisor: entering {state:?}");
        emit_guarded(self.progress.as_ref(), PipelineEvent::StateChanged(state));
    }

    #[allow(clippy::too_many_arguments)]
    fn launch(
        &self,
        workers: &mut Workers,
        items: Vec<WorkItem>,
        (store, commit): (Box<dyn LyricSink>, Receiver<bool>),
        queues: &QueueSet,
        counters: &Arc<Counters>,
        shutdown: &ShutdownSignal,
        started: Instant,
    ) -> Result<(), PipelineError> {
        {
            let input = queues.sink.clone();
            let counters = counters.clone();
            let shutdown = shutdown.clone();
            workers.sink = Some(spawn("sink".into(), move || {
                run_sink_writer(store, &input, &counters, &shutdown, &commit)
            })?);
        }

        {
            let interval = self.config.monitor_interval;
            let queues = queues.clone();
            let counters = counters.clone();
            let progress = self.progress.clone();
            let shutdown = shutdown.clone();
            workers.push(spawn("monitor".into(), move || {
                run_monitor(interval, &queues, &counters, started, progress.as_ref(), &shutdown)
            })?);
        }

        for index in 0..self.config.extract_workers {
            let name = format!("extract-{index}");
            let extractor = self.extractor.clone();
            let input = queues.extract.clone();
            let output = queues.sink.clone();
            let shutdown = shutdown.clone();
            let thread_name = name.clone();
            workers.push(spawn(name, move || {
                run_extract_worker(&thread_name, extractor.as_ref(), &input, &output, &shutdown)
            })?);
        }

        for index in 0..self.config.fetch_workers {
            let name = format!("fetch-{index}");
            let fetcher = self.fetcher.clone();
            let input = queues.fetch.clone();
            let output = queues.extract.clone();
            let shutdown = shutdown.clone();
            let thread_name = name.clone();
            workers.push(spawn(name, move || {
                run_fetch_worker(&thread_name, fetcher.as_ref(), &input, &output, &shutdown)
            })?);
        }

        let output = queues.fetch.clone();
        let counters = counters.clone();
        workers.feeder = Some(spawn("feeder".into(), move || {
            run_feeder(items, &output, &counters)
        })?);
        Ok(())
    }

    fn wait_for_drain(&self, workers: &Workers, counters: &Counters) -> Result<(), PipelineError> {
        let mut state = SupervisorState::Feeding;
        loop {
            if state == SupervisorState::Feeding && counters.is_feeding_done() {
                state = SupervisorState::Draining;
                self.enter(state);
            }
            if state == SupervisorState::Draining && counters.is_drained() {
                return Ok(());
            }
            if let Some(name) = workers.exited_early(counters) {
                lrc_error!("supervisor: worker {name} exited before shutdown");
                return Err(PipelineError::WorkerExited(name));
            }
            thread::sleep(self.config.poll_interval);
        }
    }
}

fn spawn<T, F>(name: String, body: F) -> Result<(String, JoinHandle<T>), PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match thread::Builder::new().name(name.clone()).spawn(body) {
        Ok(handle) => Ok((name, handle)),
        Err(source) => Err(PipelineError::Spawn { name, source }),
    }
}

#[derive(Default)]
struct Workers {
    feeder: Option<(String, JoinHandle<()>)>,
    sink: Option<(String, JoinHandle<Result<(), SinkError>>)>,
    pool: Vec<(String, JoinHandle<()>)>,
}

impl Workers {
    fn push(&mut self, worker: (String, JoinHandle<()>)) {
        self.pool.push(worker);
    }

    /// Name of a worker that stopped while the pipeline still needed it.
    fn exited_early(&self, counters: &Counters) -> Option<String> {
        if let Some((name, handle)) = &self.feeder {
            if handle.is_finished() && !counters.is_feeding_done() {
                return Some(name.clone());
            }
        }
        if let Some((name, handle)) = &self.sink {
            if handle.is_finished() {
                return Some(name.clone());
            }
        }
        self.pool
            .iter()
            .find(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
    }

    /// Joins feeder, pools, monitor and finally the sink writer.
    fn join(self) -> Result<(), PipelineError> {
        let mut first_error = None;
        let pooled = self.feeder.into_iter().chain(self.pool);
        for (name, handle) in pooled {
            if handle.join().is_err() {
                lrc_error!("supervisor: worker {name} panicked");
                first_error.get_or_insert(PipelineError::WorkerExited(name));
            }
        }
        if let Some((name, handle)) = self.sink {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    lrc_error!("supervisor: output store failed: {err}");
                    first_error.get_or_insert(PipelineError::Sink(err));
                }
                Err(_) => {
                    lrc_error!("supervisor: worker {name} panicked");
                    first_error.get_or_insert(PipelineError::WorkerExited(name));
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
