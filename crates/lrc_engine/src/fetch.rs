use std::time::Duration;

use encoding_rs::Encoding;
use futures_util::StreamExt;
use lrc_core::{FailureKind, FetchError, Fetcher};
use lrc_logging::{lrc_trace, lrc_warn};
use reqwest::header::CONTENT_TYPE;
use url::{form_urlencoded, Url};

use crate::decode::decode_page;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Search endpoint; the query string is replaced on every request.
    pub endpoint: String,
    pub query_param: String,
    /// Appended to every title before encoding, e.g. `" 歌词"`.
    pub query_suffix: String,
    /// Charset label the search engine expects the query in.
    pub query_encoding: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://www.baidu.com/s".to_string(),
            query_param: "wd".to_string(),
            query_suffix: " 歌词".to_string(),
            query_encoding: "gbk".to_string(),
            user_agent: concat!(
                "Mozilla/5.0 (compatible; lrc-spider/",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

/// Builds `{endpoint}?{param}={title}{suffix}`, form-urlencoded in the
/// configured charset.
pub fn build_search_url(settings: &FetchSettings, title: &str) -> Result<Url, FetchError> {
    let encoding = Encoding::for_label(settings.query_encoding.as_bytes()).ok_or_else(|| {
        FetchError::new(
            FailureKind::InvalidUrl,
            format!("unknown query encoding '{}'", settings.query_encoding),
        )
    })?;
    let mut url = Url::parse(&settings.endpoint)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

    let query = format!("{title}{}", settings.query_suffix);
    let (bytes, _, _) = encoding.encode(&query);
    let param: String = form_urlencoded::byte_serialize(settings.query_param.as_bytes()).collect();
    let value: String = form_urlencoded::byte_serialize(&bytes).collect();
    url.set_query(Some(&format!("{param}={value}")));
    Ok(url)
}

/// HTTP fetcher for the blocking worker pool.
///
/// Owns a small tokio runtime; each `fetch` call blocks the calling worker
/// thread on it, so it must not be called from inside another runtime.
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("lrc-http")
            .enable_all()
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let client = {
            let _guard = runtime.enter();
            reqwest::Client::builder()
                .connect_timeout(settings.connect_timeout)
                .timeout(settings.request_timeout)
                .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
                .user_agent(settings.user_agent.clone())
                .build()
                .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?
        };
        Ok(Self {
            settings,
            client,
            runtime,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    async fn fetch_page(&self, url: Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }
        let tld = response
            .url()
            .host_str()
            .and_then(|host| host.rsplit('.').next())
            .map(|tld| tld.to_ascii_lowercase());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let tld = tld.as_deref().map(str::as_bytes);
        let decoded = decode_page(&bytes, content_type.as_deref(), tld);
        if decoded.had_errors {
            lrc_warn!(
                "page decoded as {} with malformed bytes replaced",
                decoded.encoding_label
            );
        }
        lrc_trace!(
            "fetched {} bytes decoded as {}",
            bytes.len(),
            decoded.encoding_label
        );
        Ok(decoded.text)
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, query: &str) -> Result<String, FetchError> {
        let url = build_search_url(&self.settings, query)?;
        self.runtime.block_on(self.fetch_page(url))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{build_search_url, FetchSettings};

    #[test]
    fn default_query_is_gbk_form_encoded() {
        let url = build_search_url(&FetchSettings::default(), "北京欢迎你").unwrap();
        assert_eq!(
            url.as_str(),
            "http://www.baidu.com/s?wd=%B1%B1%BE%A9%BB%B6%D3%AD%C4%E3+%B8%E8%B4%CA"
        );
    }

    #[test]
    fn utf8_query_and_existing_query_replaced() {
        let settings = FetchSettings {
            endpoint: "https://search.example/find?old=1".into(),
            query_param: "q".into(),
            query_suffix: String::new(),
            query_encoding: "utf-8".into(),
            ..FetchSettings::default()
        };
        let url = build_search_url(&settings, "a&b c").unwrap();
        assert_eq!(url.as_str(), "https://search.example/find?q=a%26b+c");
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let settings = FetchSettings {
            query_encoding: "klingon".into(),
            ..FetchSettings::default()
        };
        assert!(build_search_url(&settings, "x").is_err());
    }
}
