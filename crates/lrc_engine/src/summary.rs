use std::path::{Path, PathBuf};

use lrc_core::RunSummary;
use serde_json::json;

use crate::persist::{parent_dir, AtomicFileWriter, PersistError};

/// Run parameters recorded next to the counters.
#[derive(Debug, Clone)]
pub struct RunDetails<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub fetch_workers: usize,
    pub extract_workers: usize,
}

/// Writes a JSON manifest of a finished run to `path`.
pub fn write_run_summary(
    path: &Path,
    summary: &RunSummary,
    details: &RunDetails<'_>,
) -> Result<PathBuf, PersistError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| PersistError::OutputDir(format!("{} has no file name", path.display())))?;

    let counters = summary.counters;
    let manifest = json!({
        "queued": counters.queued,
        "processed": counters.processed_total,
        "found": counters.processed_ok,
        "not_found": counters.not_found(),
        "elapsed_secs": summary.elapsed.as_secs_f64(),
        "fetch_workers": details.fetch_workers,
        "extract_workers": details.extract_workers,
        "input": details.input.display().to_string(),
        "output": details.output.display().to_string(),
    });

    AtomicFileWriter::new(parent_dir(path)).write(&filename, &manifest.to_string())
}
