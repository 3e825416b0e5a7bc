use std::fs;

use lrc_core::WorkItem;
use lrc_engine::{parse_song_list, read_song_list, SourceError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn titles(items: Vec<WorkItem>) -> Vec<String> {
    items.into_iter().map(WorkItem::into_title).collect()
}

#[test]
fn lines_are_trimmed_and_blank_lines_skipped() {
    let items = parse_song_list("\u{feff}北京欢迎你\n\n  稻香 \r\n   \n晴天");
    assert_eq!(titles(items), vec!["北京欢迎你", "稻香", "晴天"]);
}

#[test]
fn reads_song_list_file_in_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("songs_list");
    fs::write(&path, "b\na\nc\n").unwrap();

    assert_eq!(titles(read_song_list(&path).unwrap()), vec!["b", "a", "c"]);
}

#[test]
fn missing_song_list_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope");

    let err = read_song_list(&path).unwrap_err();
    let SourceError::Read { path: reported, .. } = &err;
    assert_eq!(reported, &path);
    assert!(err.to_string().starts_with("read "));
}
