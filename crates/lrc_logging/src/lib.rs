#![deny(missing_docs)]
//! Logging front end for the lyric spider crates.
//!
//! Every crate logs through the `lrc_*` macros, which forward to the `log`
//! facade. The binary decides where the records go.

use log::LevelFilter;

#[doc(hidden)]
pub use log as __log;

/// Per-byte and per-request detail; off unless the level is raised by hand.
#[macro_export]
macro_rules! lrc_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// Worker start-up and progress lines, shown with `-v`.
#[macro_export]
macro_rules! lrc_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Per-song steps, shown with `-d`.
#[macro_export]
macro_rules! lrc_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Recoverable per-song failures.
#[macro_export]
macro_rules! lrc_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Failures that lose a result or end the run.
#[macro_export]
macro_rules! lrc_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Maps the `--verbose` / `--debug` switches onto a level filter.
///
/// Debug wins over verbose; with neither only warnings and errors pass.
pub fn level_for_flags(verbose: bool, debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
