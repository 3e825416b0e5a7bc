use lrc_core::Extractor;
use lrc_engine::{decode_page, LyricBlockExtractor};
use pretty_assertions::assert_eq;

fn result_page(block: &str) -> String {
    format!(
        r#"<html><head><title>results</title></head><body>
        <div class="result"><h3>some other hit</h3></div>
        {block}
        </body></html>"#
    )
}

#[test]
fn extracts_one_line_per_break() {
    let page = result_page(
        r#"<div class="c-gap-top-small op-lrc-text-c">
            迎接另一个晨曦<br/>  带来全新空气 <br><br>
            气息改变情味不变<br>
        </div>"#,
    );
    let lyric = LyricBlockExtractor::baidu().unwrap().extract(&page);
    assert_eq!(
        lyric.as_deref(),
        Some("迎接另一个晨曦\n带来全新空气\n气息改变情味不变")
    );
}

#[test]
fn only_the_first_block_is_used() {
    let page = result_page(
        r#"<div class="c-gap-top-small op-lrc-text-c">first</div>
           <div class="c-gap-top-small op-lrc-text-c">second</div>"#,
    );
    let lyric = LyricBlockExtractor::baidu().unwrap().extract(&page);
    assert_eq!(lyric.as_deref(), Some("first"));
}

#[test]
fn nested_markup_is_flattened_and_scripts_skipped() {
    let page = result_page(
        r#"<div class="c-gap-top-small op-lrc-text-c">
            <p>line <span>one</span></p><p>line two</p>
            <script>var x = 1;</script>
        </div>"#,
    );
    let lyric = LyricBlockExtractor::baidu().unwrap().extract(&page);
    assert_eq!(lyric.as_deref(), Some("line one\nline two"));
}

#[test]
fn missing_or_empty_block_is_not_found() {
    let extractor = LyricBlockExtractor::baidu().unwrap();
    assert_eq!(extractor.extract(&result_page("")), None);
    assert_eq!(
        extractor.extract(&result_page(
            r#"<div class="c-gap-top-small op-lrc-text-c"> <br> </div>"#
        )),
        None
    );
    assert_eq!(extractor.extract("<div class=\"c-gap"), None);
    assert_eq!(extractor.extract(""), None);
}

#[test]
fn extraction_is_idempotent() {
    let page = result_page(r#"<div class="c-gap-top-small op-lrc-text-c">a<br>b</div>"#);
    let extractor = LyricBlockExtractor::baidu().unwrap();
    assert_eq!(extractor.extract(&page), extractor.extract(&page));
}

#[test]
fn custom_and_invalid_selectors() {
    let extractor = LyricBlockExtractor::new("pre.lyrics").unwrap();
    let lyric = extractor.extract("<html><body><pre class=\"lyrics\">la la</pre></body></html>");
    assert_eq!(lyric.as_deref(), Some("la la"));

    let err = LyricBlockExtractor::new("div[").unwrap_err();
    assert_eq!(err.selector, "div[");
}

#[test]
fn decode_respects_charset_header() {
    let bytes = b"caf\xe9"; // iso-8859-1
    let decoded = decode_page(bytes, Some("text/html; charset=ISO-8859-1"), None);
    assert_eq!(decoded.text, "café");
    assert!(
        decoded.encoding_label.eq_ignore_ascii_case("ISO-8859-1")
            || decoded.encoding_label.eq_ignore_ascii_case("windows-1252")
    );
}

#[test]
fn decode_handles_utf8_bom() {
    let bytes = b"\xEF\xBB\xBFhello";
    let decoded = decode_page(bytes, Some("text/html"), None);
    assert_eq!(decoded.text, "hello");
    assert_eq!(decoded.encoding_label, "UTF-8");
}

#[test]
fn malformed_bytes_are_replaced_and_flagged() {
    let decoded = decode_page(b"ab\xffcd", Some("text/html; charset=utf-8"), None);
    assert_eq!(decoded.text, "ab\u{fffd}cd");
    assert_eq!(decoded.encoding_label, "UTF-8");
    assert!(decoded.had_errors);
}

#[test]
fn lyric_survives_a_bad_byte_elsewhere_in_the_page() {
    let mut bytes = b"<html><head><title>\xff</title></head><body>".to_vec();
    bytes.extend_from_slice(br#"<div class="c-gap-top-small op-lrc-text-c">line one<br>line two</div>"#);
    bytes.extend_from_slice(b"</body></html>");

    let decoded = decode_page(&bytes, Some("text/html; charset=utf-8"), None);
    assert!(decoded.had_errors);
    let lyric = LyricBlockExtractor::baidu().unwrap().extract(&decoded.text);
    assert_eq!(lyric.as_deref(), Some("line one\nline two"));
}

#[test]
fn decoded_page_feeds_extractor() {
    // GBK for "歌词" inside the lyric block, charset only in the header.
    let mut bytes = br#"<html><body><div class="c-gap-top-small op-lrc-text-c">"#.to_vec();
    bytes.extend_from_slice(&[0xB8, 0xE8, 0xB4, 0xCA]);
    bytes.extend_from_slice(b"</div></body></html>");

    let decoded = decode_page(&bytes, Some("text/html; charset=GBK"), None);
    assert_eq!(decoded.encoding_label, "GBK");
    let lyric = LyricBlockExtractor::baidu().unwrap().extract(&decoded.text);
    assert_eq!(lyric.as_deref(), Some("歌词"));
}
