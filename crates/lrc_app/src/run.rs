use std::sync::Arc;

use anyhow::Context;
use lrc_core::{RunSummary, Supervisor};
use lrc_engine::{
    read_song_list, write_run_summary, LyricBlockExtractor, LyricFile, ReqwestFetcher, RunDetails,
};
use lrc_logging::lrc_info;

use crate::config::Settings;

/// Sets up every collaborator, then hands over to the supervisor.
///
/// Everything that can fail at start-up fails here, before a worker exists.
pub fn run(settings: &Settings) -> anyhow::Result<RunSummary> {
    settings.pipeline.validate()?;
    let songs = read_song_list(&settings.input)?;
    let extractor = LyricBlockExtractor::new(&settings.lyric_selector)?;
    let fetcher =
        ReqwestFetcher::new(settings.fetch.clone()).context("failed to set up HTTP client")?;
    let store = LyricFile::create(&settings.output)
        .with_context(|| format!("cannot write output {}", settings.output.display()))?;

    lrc_info!(
        "spider: {} songs, {} download threads, {} parse threads, output {}",
        songs.len(),
        settings.pipeline.fetch_workers,
        settings.pipeline.extract_workers,
        settings.output.display()
    );

    let supervisor = Supervisor::new(
        settings.pipeline.clone(),
        Arc::new(fetcher),
        Arc::new(extractor),
    );
    let summary = supervisor.run(songs, Box::new(store))?;

    if let Some(path) = settings.summary.as_deref() {
        let details = RunDetails {
            input: &settings.input,
            output: &settings.output,
            fetch_workers: settings.pipeline.fetch_workers,
            extract_workers: settings.pipeline.extract_workers,
        };
        write_run_summary(path, &summary, &details)
            .with_context(|| format!("cannot write summary {}", path.display()))?;
    }
    Ok(summary)
}
