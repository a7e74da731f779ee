//! End-to-end tests for the fetch handler against a mock HTTP server.

use clap::Parser;
use filesvc_cli::handlers::fetch::{self, FetchArgs};
use filesvc_cli::{Cli, CliConfig, bootstrap};

async fn context_for(server: &mockito::ServerGuard) -> filesvc_cli::CliContext {
    let base_url = format!("{}/files/", server.url());
    let cli = Cli::parse_from(["filesvc", "--base-url", &base_url, "--timeout-secs", "5", "config"]);
    bootstrap(CliConfig::from_cli(&cli).unwrap()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duplicate_keys_share_one_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/files/img-42.png")
        .with_body("PNGDATA")
        .expect(1)
        .create_async()
        .await;

    let ctx = context_for(&server).await;
    let out = tempfile::tempdir().unwrap();
    let args = FetchArgs {
        keys: vec!["img-42.png".to_string(), "img-42.png".to_string()],
        out: Some(out.path().to_path_buf()),
        subscribers: 3,
    };

    let report = fetch::execute(&ctx, &args).await.unwrap();

    mock.assert_async().await;
    assert_eq!(report.jobs, 1);
    assert_eq!(report.failures(), 0);
    for outcome in &report.outcomes {
        assert_eq!(outcome.deliveries, 3);
        assert_eq!(outcome.result.as_deref().ok(), Some(&b"PNGDATA"[..]));
    }
    assert!(report.outcomes[0].written_to.is_some());
    assert!(report.outcomes[1].written_to.is_none());

    let written = std::fs::read(out.path().join("img-42.png")).unwrap();
    assert_eq!(written, b"PNGDATA");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failures_are_reported_per_key() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("GET", "/files/good")
        .with_body("ok")
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/files/bad")
        .with_status(404)
        .create_async()
        .await;

    let ctx = context_for(&server).await;
    let args = FetchArgs {
        keys: vec!["good".to_string(), "bad".to_string()],
        out: None,
        subscribers: 1,
    };

    let report = fetch::execute(&ctx, &args).await.unwrap();
    assert_eq!(report.jobs, 2);
    assert_eq!(report.failures(), 1);

    let bad = &report.outcomes[1];
    assert_eq!(bad.key, "bad");
    assert_eq!(
        bad.result.as_ref().unwrap_err().to_string(),
        "Transport failure: HTTP 404 Not Found"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn colliding_file_names_do_not_overwrite() {
    let mut server = mockito::Server::new_async().await;
    let _a = server
        .mock("GET", "/files/a/x.png")
        .with_body("AAA")
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/files/b/x.png")
        .with_body("BBB")
        .create_async()
        .await;

    let ctx = context_for(&server).await;
    let out = tempfile::tempdir().unwrap();
    let args = FetchArgs {
        keys: vec!["a/x.png".to_string(), "b/x.png".to_string()],
        out: Some(out.path().to_path_buf()),
        subscribers: 1,
    };

    let report = fetch::execute(&ctx, &args).await.unwrap();
    assert_eq!(report.failures(), 0);

    let first = report.outcomes[0].written_to.clone().unwrap();
    let second = report.outcomes[1].written_to.clone().unwrap();
    assert_eq!(first, out.path().join("x.png"));
    assert_eq!(second, out.path().join("x-1.png"));
    assert_eq!(std::fs::read(first).unwrap(), b"AAA");
    assert_eq!(std::fs::read(second).unwrap(), b"BBB");
}
