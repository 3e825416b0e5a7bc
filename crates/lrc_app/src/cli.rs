//! Command-line definition for `lrc-spider`.

use std::path::PathBuf;

use clap::Parser;

/// Download lyrics for a list of songs from search result pages.
///
/// Songs are fetched and parsed by two thread pools; every lyric found is
/// appended to the output file behind a dashed separator line.
#[derive(Parser, Debug, Default)]
#[command(name = "lrc-spider", version, about, long_about = None)]
pub struct Cli {
    /// Song list file, one title per line [default: songs_list]
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Lyric output file [default: lrc]
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Number of download threads [default: 8]
    #[arg(short = 't', long, visible_alias = "thread-num", value_parser = parse_positive_usize)]
    pub fetch_workers: Option<usize>,

    /// Number of parse threads [default: 8]
    #[arg(short = 'p', long, visible_alias = "parse-thread-num", value_parser = parse_positive_usize)]
    pub extract_workers: Option<usize>,

    /// Print progress and worker start-up
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print every per-song step
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// RON file with option overrides and fetch settings
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(err) => Err(err.to_string()),
    }
}
