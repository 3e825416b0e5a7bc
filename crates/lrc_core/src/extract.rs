use lrc_logging::{lrc_debug, lrc_info};

use crate::guard::guarded;
use crate::{Extracted, Fetched, ShutdownSignal, WorkQueue};

/// Pulls the lyric block out of a page. Must never fail: malformed or
/// unexpected markup yields `None`.
pub trait Extractor: Send + Sync {
    fn extract(&self, page: &str) -> Option<String>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn extract(&self, page: &str) -> Option<String> {
        self(page)
    }
}

pub(crate) fn run_extract_worker(
    name: &str,
    extractor: &dyn Extractor,
    input: &WorkQueue<Fetched>,
    output: &WorkQueue<Extracted>,
    shutdown: &ShutdownSignal,
) {
    lrc_info!("{name}: started");
    while let Some(Fetched { item, page }) = input.get(shutdown) {
        let lyric = match page {
            Some(page) => guarded(name, &item, || extractor.extract(&page)).flatten(),
            None => None,
        };
        lrc_debug!(
            "{name}: '{item}' {}",
            if lyric.is_some() { "lyric found" } else { "no lyric" }
        );
        output.put(Extracted { item, lyric });
    }
    lrc_debug!("{name}: stopped");
}
