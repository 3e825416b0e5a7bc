//! Run settings: built-in defaults, overridden by an optional RON file,
//! overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use lrc_core::PipelineConfig;
use lrc_engine::{FetchSettings, DEFAULT_LYRIC_SELECTOR};
use ron::extensions::Extensions;
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_INPUT: &str = "songs_list";
pub const DEFAULT_OUTPUT: &str = "lrc";

/// Contents of `--config`. Every field is optional.
///
/// ```ron
/// (
///     fetch_workers: 16,
///     lyric_selector: "div.lyrics",
///     fetch: (request_timeout_ms: 5000, query_encoding: "utf-8"),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub fetch_workers: Option<usize>,
    pub extract_workers: Option<usize>,
    pub monitor_interval_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub lyric_selector: Option<String>,
    pub fetch: FetchFileConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchFileConfig {
    pub endpoint: Option<String>,
    pub query_param: Option<String>,
    pub query_suffix: Option<String>,
    pub query_encoding: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub redirect_limit: Option<usize>,
    pub max_bytes: Option<u64>,
}

impl FetchFileConfig {
    fn apply(self, settings: &mut FetchSettings) {
        if let Some(endpoint) = self.endpoint {
            settings.endpoint = endpoint;
        }
        if let Some(param) = self.query_param {
            settings.query_param = param;
        }
        if let Some(suffix) = self.query_suffix {
            settings.query_suffix = suffix;
        }
        if let Some(encoding) = self.query_encoding {
            settings.query_encoding = encoding;
        }
        if let Some(agent) = self.user_agent {
            settings.user_agent = agent;
        }
        if let Some(ms) = self.connect_timeout_ms {
            settings.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.request_timeout = Duration::from_millis(ms);
        }
        if let Some(limit) = self.redirect_limit {
            settings.redirect_limit = limit;
        }
        if let Some(max) = self.max_bytes {
            settings.max_bytes = max;
        }
    }
}

pub fn parse_file_config(text: &str) -> anyhow::Result<FileConfig> {
    let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    Ok(options.from_str(text)?)
}

pub fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {} failed", path.display()))?;
    parse_file_config(&text).with_context(|| format!("invalid config {}", path.display()))
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pipeline: PipelineConfig,
    pub fetch: FetchSettings,
    pub lyric_selector: String,
    pub summary: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
    pub debug: bool,
}

impl Settings {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let file = match cli.config.as_deref() {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(cli, file))
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            fetch_workers: cli
                .fetch_workers
                .or(file.fetch_workers)
                .unwrap_or(defaults.fetch_workers),
            extract_workers: cli
                .extract_workers
                .or(file.extract_workers)
                .unwrap_or(defaults.extract_workers),
            monitor_interval: file
                .monitor_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.monitor_interval),
            poll_interval: file
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        };

        let mut fetch = FetchSettings::default();
        file.fetch.apply(&mut fetch);

        Self {
            input: cli
                .input
                .clone()
                .or(file.input)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            output: cli
                .output
                .clone()
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            pipeline,
            fetch,
            lyric_selector: file
                .lyric_selector
                .unwrap_or_else(|| DEFAULT_LYRIC_SELECTOR.to_string()),
            summary: cli.summary.clone(),
            log_file: cli.log_file.clone(),
            verbose: cli.verbose,
            debug: cli.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_file_config, FileConfig, Settings, DEFAULT_INPUT, DEFAULT_OUTPUT};
    use crate::cli::Cli;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = Settings::resolve(&Cli::default(), FileConfig::default());
        assert_eq!(settings.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(settings.pipeline.fetch_workers, 8);
        assert_eq!(settings.pipeline.extract_workers, 8);
        assert_eq!(settings.pipeline.monitor_interval, Duration::from_secs(2));
        assert_eq!(settings.fetch.query_encoding, "gbk");
    }

    #[test]
    fn file_overrides_defaults_and_flags_override_file() {
        let file = parse_file_config(
            r#"(
                output: "from_file",
                fetch_workers: 16,
                extract_workers: 2,
                poll_interval_ms: 10,
                fetch: (request_timeout_ms: 500, query_encoding: "utf-8"),
            )"#,
        )
        .unwrap();
        let cli = Cli {
            fetch_workers: Some(3),
            ..Cli::default()
        };

        let settings = Settings::resolve(&cli, file);
        assert_eq!(settings.output, PathBuf::from("from_file"));
        assert_eq!(settings.pipeline.fetch_workers, 3);
        assert_eq!(settings.pipeline.extract_workers, 2);
        assert_eq!(settings.pipeline.poll_interval, Duration::from_millis(10));
        assert_eq!(settings.fetch.request_timeout, Duration::from_millis(500));
        assert_eq!(settings.fetch.query_encoding, "utf-8");
        assert_eq!(settings.fetch.query_param, "wd");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_file_config("(fetch_threads: 4)").is_err());
    }
}
