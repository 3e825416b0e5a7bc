use std::fmt;

/// One song title travelling through the pipeline.
///
/// Not `Clone`: an item moves from stage to stage and is held by exactly one
/// queue or worker at a time.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct WorkItem {
    title: String,
}

impl WorkItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn into_title(self) -> String {
        self.title
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl From<&str> for WorkItem {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl From<String> for WorkItem {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

/// Output of the fetch stage. `page == None` marks a failed fetch.
#[derive(Debug, PartialEq, Eq)]
pub struct Fetched {
    pub item: WorkItem,
    pub page: Option<String>,
}

/// Output of the extract stage. `lyric == None` means nothing was found.
#[derive(Debug, PartialEq, Eq)]
pub struct Extracted {
    pub item: WorkItem,
    pub lyric: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
