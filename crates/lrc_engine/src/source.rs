use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lrc_core::WorkItem;
use lrc_logging::lrc_info;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("read {path} failed: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Loads the whole song list up front; one title per line.
pub fn read_song_list(path: &Path) -> Result<Vec<WorkItem>, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let songs = parse_song_list(&text);
    lrc_info!("loaded {} songs from {}", songs.len(), path.display());
    Ok(songs)
}

pub fn parse_song_list(text: &str) -> Vec<WorkItem> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(WorkItem::from)
        .collect()
}
