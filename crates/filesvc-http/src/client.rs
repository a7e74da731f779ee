//! reqwest-backed fetcher.

use bytes::{Bytes, BytesMut};
use filesvc_core::ProgressSink;
use url::Url;

use crate::config::HttpFetcherConfig;
use crate::error::{HttpError, HttpResult};

/// Upper bound for pre-allocating the body buffer from `Content-Length`.
const MAX_PREALLOC: usize = 8 * 1024 * 1024;

/// Fetches storage keys over HTTP(S).
///
/// One GET per fetch, no retries and no authentication. Use it through the
/// [`FileFetcherPort`](filesvc_core::FileFetcherPort) implementation.
#[derive(Debug, Clone)]
pub struct HttpFileFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpFileFetcher {
    /// Create a fetcher from its configuration.
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be
    /// initialised.
    pub fn new(config: &HttpFetcherConfig) -> HttpResult<Self> {
        let base_url = config.base_url.as_deref().map(Url::parse).transpose()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Resolve a storage key to the URL it is fetched from.
    pub fn resolve_url(&self, key: &str) -> HttpResult<Url> {
        let unresolvable = |reason: String| HttpError::UnresolvableKey {
            key: key.to_string(),
            reason,
        };

        if key.trim().is_empty() {
            return Err(unresolvable("empty key".to_string()));
        }
        let url = match &self.base_url {
            Some(base) => base.join(key),
            None => Url::parse(key),
        }
        .map_err(|e| unresolvable(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(unresolvable(format!("unsupported scheme '{other}'"))),
        }
    }

    /// GET `url`, streaming the body and reporting progress against
    /// `Content-Length` when the server sends one.
    ///
    /// An empty body yields `Ok(None)`.
    pub(crate) async fn fetch_url(
        &self,
        url: Url,
        progress: &ProgressSink,
    ) -> HttpResult<Option<Bytes>> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status { status });
        }

        let total = response.content_length();
        let capacity = total
            .and_then(|t| usize::try_from(t).ok())
            .unwrap_or(0)
            .min(MAX_PREALLOC);
        let mut body = BytesMut::with_capacity(capacity);
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            downloaded += chunk.len() as u64;
            body.extend_from_slice(&chunk);
            progress.report_bytes(downloaded, total);
        }

        // A zero-length 200 is "no data": jobs report it as `EmptyResponse`,
        // so an empty remote file is never delivered as a success.
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(body.freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base: Option<&str>) -> HttpFileFetcher {
        let config =
            HttpFetcherConfig::new().with_optional_base_url(base.map(ToString::to_string));
        HttpFileFetcher::new(&config).unwrap()
    }

    #[test]
    fn test_resolve_relative_key() {
        let fetcher = fetcher(Some("https://cdn.example.com/files/"));
        let url = fetcher.resolve_url("img-42.png").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/files/img-42.png");
    }

    #[test]
    fn test_resolve_absolute_key_without_base() {
        let fetcher = fetcher(None);
        let url = fetcher.resolve_url("http://example.org/a.bin").unwrap();
        assert_eq!(url.host_str(), Some("example.org"));
    }

    #[test]
    fn test_relative_key_without_base_is_unresolvable() {
        let fetcher = fetcher(None);
        assert!(matches!(
            fetcher.resolve_url("img-42.png"),
            Err(HttpError::UnresolvableKey { .. })
        ));
    }

    #[test]
    fn test_empty_key_is_unresolvable() {
        let fetcher = fetcher(Some("https://cdn.example.com/"));
        assert!(matches!(
            fetcher.resolve_url("  "),
            Err(HttpError::UnresolvableKey { reason, .. }) if reason == "empty key"
        ));
    }

    #[test]
    fn test_non_http_scheme_is_unresolvable() {
        let fetcher = fetcher(Some("https://cdn.example.com/"));
        let err = fetcher.resolve_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'file'"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = HttpFetcherConfig::new().with_base_url("not a url");
        assert!(matches!(
            HttpFileFetcher::new(&config),
            Err(HttpError::InvalidBaseUrl(_))
        ));
    }
}
