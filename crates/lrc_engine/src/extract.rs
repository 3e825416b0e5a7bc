use ego_tree::NodeRef;
use lrc_core::Extractor;
use scraper::node::Node;
use scraper::{Html, Selector};

/// Baidu's inline lyric box on a search result page.
pub const DEFAULT_LYRIC_SELECTOR: &str = "div.c-gap-top-small.op-lrc-text-c";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid lyric selector '{selector}': {message}")]
pub struct ExtractorError {
    pub selector: String,
    pub message: String,
}

/// Takes the first element matching a CSS selector and returns its text,
/// one trimmed line per `<br>` or block element, blank lines dropped.
#[derive(Debug)]
pub struct LyricBlockExtractor {
    selector: Selector,
}

impl LyricBlockExtractor {
    pub fn new(css: &str) -> Result<Self, ExtractorError> {
        let selector = Selector::parse(css).map_err(|err| ExtractorError {
            selector: css.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self { selector })
    }

    pub fn baidu() -> Result<Self, ExtractorError> {
        Self::new(DEFAULT_LYRIC_SELECTOR)
    }
}

impl Extractor for LyricBlockExtractor {
    fn extract(&self, page: &str) -> Option<String> {
        let doc = Html::parse_document(page);
        let block = doc.select(&self.selector).next()?;

        let mut raw = String::new();
        collect_text(*block, &mut raw);

        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => match element.name() {
                "br" => out.push('\n'),
                "script" | "style" | "noscript" | "template" => {}
                "p" | "div" | "li" | "ul" | "ol" | "section" | "header" | "footer" | "table"
                | "tr" | "blockquote" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    out.push('\n');
                    collect_text(child, out);
                    out.push('\n');
                }
                _ => collect_text(child, out),
            },
            _ => {}
        }
    }
}
