use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lrc_core::{LyricSink, SinkError, WorkItem};
use tempfile::NamedTempFile;
use thiserror::Error;

/// 50 dashes; precedes every lyric record.
pub const RECORD_SEPARATOR: &str = "--------------------------------------------------";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<PersistError> for SinkError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Io(io) => SinkError::Io(io),
            other => SinkError::Other(other.to_string()),
        }
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Directory a file path lives in; `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Replace `target` with a fully written temp file.
fn commit(mut tmp: NamedTempFile, target: &Path) -> Result<(), PersistError> {
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    // Replace existing file if present so the rename also works on Windows.
    if target.exists() {
        fs::remove_file(target)?;
    }
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        commit(tmp, &target)?;
        Ok(target)
    }
}

pub fn format_record(lyric: &str) -> String {
    format!("{RECORD_SEPARATOR}\n{lyric}\n\n")
}

/// The lyric output file.
///
/// Records are appended to a temp file next to the target and the temp file
/// replaces the target on `finish`. Dropping an unfinished `LyricFile` leaves
/// any previous output untouched.
pub struct LyricFile {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
    records: u64,
}

impl LyricFile {
    pub fn create(target: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let target = target.into();
        if target.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is a directory",
                target.display()
            )));
        }
        let dir = parent_dir(&target);
        ensure_output_dir(&dir)?;
        let tmp = NamedTempFile::new_in(&dir)?;
        Ok(Self {
            target,
            tmp: Some(tmp),
            records: 0,
        })
    }

    pub fn records(&self) -> u64 {
        self.records
    }
}

impl LyricSink for LyricFile {
    fn append(&mut self, _item: &WorkItem, lyric: &str) -> Result<(), SinkError> {
        let tmp = self
            .tmp
            .as_mut()
            .ok_or_else(|| SinkError::Other("lyric file already finished".into()))?;
        tmp.write_all(format_record(lyric).as_bytes())?;
        tmp.flush()?;
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        match self.tmp.take() {
            Some(tmp) => Ok(commit(tmp, &self.target)?),
            None => Ok(()),
        }
    }
}
