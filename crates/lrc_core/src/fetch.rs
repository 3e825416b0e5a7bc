use lrc_logging::{lrc_debug, lrc_info, lrc_warn};

use crate::guard::guarded;
use crate::{FetchError, Fetched, ShutdownSignal, WorkItem, WorkQueue};

/// Turns a song title into the raw text of a search result page.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, query: &str) -> Result<String, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<String, FetchError> + Send + Sync,
{
    fn fetch(&self, query: &str) -> Result<String, FetchError> {
        self(query)
    }
}

/// One fetch worker. Every item taken from `input` is forwarded to `output`,
/// with `page: None` when the fetch failed.
pub(crate) fn run_fetch_worker(
    name: &str,
    fetcher: &dyn Fetcher,
    input: &WorkQueue<WorkItem>,
    output: &WorkQueue<Fetched>,
    shutdown: &ShutdownSignal,
) {
    lrc_info!("{name}: started");
    while let Some(item) = input.get(shutdown) {
        let page = match guarded(name, &item, || fetcher.fetch(item.title())) {
            Some(Ok(page)) => {
                lrc_debug!("{name}: page fetched for '{item}' ({} bytes)", page.len());
                Some(page)
            }
            Some(Err(err)) => {
                lrc_warn!("{name}: fetch failed for '{item}': {err}");
                None
            }
            None => None,
        };
        output.put(Fetched { item, page });
    }
    lrc_debug!("{name}: stopped");
}
