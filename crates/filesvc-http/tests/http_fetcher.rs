//! `HttpFileFetcher` against a local mock server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use filesvc_core::{FileError, FileFetcherPort, ProgressSink};
use filesvc_http::{HttpFetcherConfig, HttpFileFetcher};

fn fetcher_for(server: &mockito::ServerGuard) -> HttpFileFetcher {
    let config = HttpFetcherConfig::new().with_base_url(format!("{}/files/", server.url()));
    HttpFileFetcher::new(&config).unwrap()
}

fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<f32>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = Arc::clone(&seen);
        ProgressSink::new(move |fraction| seen.lock().unwrap().push(fraction))
    };
    (sink, seen)
}

#[tokio::test]
async fn fetches_body_and_reports_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files/img-42.png")
        .with_status(200)
        .with_body("DATA")
        .create_async()
        .await;

    let fetcher = fetcher_for(&server);
    let (sink, seen) = recording_sink();
    let body = fetcher.fetch("img-42.png", sink).await.unwrap();

    assert_eq!(body.as_deref(), Some(&b"DATA"[..]));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.last().copied(), Some(1.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    mock.assert_async().await;
}

#[tokio::test]
async fn sends_configured_user_agent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files/a")
        .match_header("user-agent", "filesvc-test/1.0")
        .with_body("x")
        .create_async()
        .await;

    let config = HttpFetcherConfig::new()
        .with_base_url(format!("{}/files/", server.url()))
        .with_user_agent("filesvc-test/1.0");
    let fetcher = HttpFileFetcher::new(&config).unwrap();
    fetcher.fetch("a", ProgressSink::noop()).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_transport_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/files/missing")
        .with_status(404)
        .create_async()
        .await;

    let result = fetcher_for(&server)
        .fetch("missing", ProgressSink::noop())
        .await;
    assert_eq!(result, Err(FileError::transport("HTTP 404 Not Found")));
}

#[tokio::test]
async fn empty_body_completes_without_data() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/files/empty")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let result = fetcher_for(&server)
        .fetch("empty", ProgressSink::noop())
        .await;
    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn unsupported_scheme_is_invalid_key() {
    let server = mockito::Server::new_async().await;
    let result = fetcher_for(&server)
        .fetch("ftp://example.org/file", ProgressSink::noop())
        .await;
    assert_eq!(result, Err(FileError::invalid_key("ftp://example.org/file")));
}

#[tokio::test]
async fn unreachable_host_is_transport_failure() {
    let config = HttpFetcherConfig::new()
        .with_base_url("http://127.0.0.1:9/")
        .with_timeout(Duration::from_secs(2));
    let fetcher = HttpFileFetcher::new(&config).unwrap();

    let result = fetcher.fetch("anything", ProgressSink::noop()).await;
    assert!(matches!(
        result,
        Err(FileError::TransportFailure { message: Some(_) })
    ));
}
