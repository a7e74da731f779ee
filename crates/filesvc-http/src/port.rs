//! Port trait implementation for `HttpFileFetcher`.

use async_trait::async_trait;
use bytes::Bytes;
use filesvc_core::{FileError, FileFetcherPort, ProgressSink};

use crate::client::HttpFileFetcher;
use crate::error::HttpError;

/// Convert internal `HttpError` to core `FileError`.
fn map_error(err: HttpError) -> FileError {
    match err {
        HttpError::UnresolvableKey { key, .. } => FileError::invalid_key(key),
        HttpError::Status { status } => FileError::transport(format!("HTTP {status}")),
        HttpError::Network(e) if e.is_timeout() => FileError::transport("timeout"),
        HttpError::Network(e) => FileError::transport(e.to_string()),
        HttpError::InvalidBaseUrl(e) => FileError::transport(e.to_string()),
    }
}

#[async_trait]
impl FileFetcherPort for HttpFileFetcher {
    async fn fetch(&self, key: &str, progress: ProgressSink) -> Result<Option<Bytes>, FileError> {
        let url = self.resolve_url(key).map_err(|e| {
            tracing::debug!(target: "filesvc.http", key, error = %e, "Rejected storage key");
            map_error(e)
        })?;

        tracing::debug!(target: "filesvc.http", key, url = %url, "GET");
        match self.fetch_url(url, &progress).await {
            Ok(body) => {
                tracing::debug!(
                    target: "filesvc.http",
                    key,
                    bytes = body.as_ref().map_or(0, Bytes::len),
                    "Fetch complete"
                );
                Ok(body)
            }
            Err(e) => {
                tracing::warn!(target: "filesvc.http", key, error = %e, "Fetch failed");
                Err(map_error(e))
            }
        }
    }
}
