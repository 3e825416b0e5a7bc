//! Lyric spider engine: the IO collaborators plugged into the core pipeline.
mod decode;
mod extract;
mod fetch;
mod persist;
mod source;
mod summary;

pub use decode::{decode_page, DecodedPage};
pub use extract::{ExtractorError, LyricBlockExtractor, DEFAULT_LYRIC_SELECTOR};
pub use fetch::{build_search_url, FetchSettings, ReqwestFetcher};
pub use persist::{
    ensure_output_dir, format_record, AtomicFileWriter, LyricFile, PersistError, RECORD_SEPARATOR,
};
pub use source::{parse_song_list, read_song_list, SourceError};
pub use summary::{write_run_summary, RunDetails};
