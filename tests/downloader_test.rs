//! Downloader routing, session lifecycle and flow behavior.

mod mocks;

use std::sync::Arc;
use tempfile::TempDir;

use mocks::{test_config, MockEngine, PageScript};
use stockfetch::download::{Downloader, Site};

fn downloader_with(script: PageScript, dir: &TempDir) -> (Arc<MockEngine>, Downloader) {
    let engine = Arc::new(MockEngine::new(script));
    let downloader = Downloader::new(engine.clone(), &test_config(dir.path()));
    (engine, downloader)
}

#[tokio::test]
async fn unsupported_url_returns_none_without_a_session() {
    let dir = TempDir::new().unwrap();
    let (engine, downloader) = downloader_with(PageScript::default(), &dir);

    let result = downloader.download_file("https://example.com/file.zip").await;

    assert!(result.is_none());
    assert_eq!(engine.launch_count(), 0, "no browser session for unsupported URLs");
    assert!(engine.ops().is_empty());
}

#[tokio::test]
async fn unconfigured_marketplace_returns_none_without_a_session() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.envato = None;
    let engine = Arc::new(MockEngine::new(PageScript::default()));
    let downloader = Downloader::new(engine.clone(), &config);

    let result = downloader.download_file("https://elements.envato.com/some-asset").await;

    assert!(result.is_none());
    assert_eq!(engine.launch_count(), 0);
}

#[tokio::test]
async fn freepik_download_with_visible_button_yields_local_path() {
    let dir = TempDir::new().unwrap();
    let script = PageScript::with_visible(&["css:button.download-button"]).downloading("asset.zip");
    let (engine, downloader) = downloader_with(script, &dir);

    let path = downloader
        .download_file("https://www.freepik.com/item/123")
        .await
        .expect("download should succeed");

    assert_eq!(path, dir.path().join("asset.zip"));
    assert!(path.exists(), "downloaded file persisted to disk");

    let ops = engine.ops();
    assert!(ops.contains(&"goto:https://www.freepik.com/login".to_string()));
    assert!(ops.contains(&"goto:https://www.freepik.com/item/123".to_string()));
    assert_eq!(ops.last().unwrap(), "close", "session released after the flow");
}

#[tokio::test]
async fn freepik_probe_prefers_first_visible_trigger() {
    let dir = TempDir::new().unwrap();
    // Both the preferred selector and the broad text match are visible;
    // the ordered probe must pick the selector.
    let script = PageScript::with_visible(&["css:button.download-button", "text:Download"])
        .downloading("asset.zip");
    let (engine, downloader) = downloader_with(script, &dir);

    downloader
        .download_file("https://www.freepik.com/item/123")
        .await
        .expect("download should succeed");

    assert!(engine
        .ops()
        .contains(&"download_via:css:button.download-button".to_string()));
}

#[tokio::test]
async fn no_visible_trigger_yields_none_and_releases_session() {
    let dir = TempDir::new().unwrap();
    let (engine, downloader) = downloader_with(PageScript::default(), &dir);

    let result = downloader.download_file("https://www.freepik.com/item/123").await;

    assert!(result.is_none());
    assert_eq!(engine.launch_count(), 1);
    assert_eq!(engine.ops().last().unwrap(), "close", "session released on failure too");
}

#[tokio::test]
async fn envato_download_confirms_with_last_visible_trigger() {
    let dir = TempDir::new().unwrap();
    // Both confirmation candidates visible: the later one wins.
    let script = PageScript::with_visible(&["text:Download", "text:Add & Download"])
        .downloading("envato-item.zip");
    let (engine, downloader) = downloader_with(script, &dir);

    let path = downloader
        .download_file("https://elements.envato.com/some-asset")
        .await
        .expect("download should succeed");

    assert!(path.exists());
    let ops = engine.ops();
    assert!(ops.contains(&"click_trigger:text:Download".to_string()));
    assert!(
        ops.contains(&"download_via:text:Download".to_string()),
        "confirm list is [Add & Download, Download], last visible is Download"
    );
}

#[tokio::test]
async fn navigation_failure_aborts_and_releases_session() {
    let dir = TempDir::new().unwrap();
    let script = PageScript {
        fail_navigation: true,
        ..PageScript::default()
    };
    let (engine, downloader) = downloader_with(script, &dir);

    let result = downloader.download_file("https://www.freepik.com/item/123").await;

    assert!(result.is_none());
    assert_eq!(engine.ops().last().unwrap(), "close");
}

#[tokio::test]
async fn test_login_runs_sign_in_only() {
    let dir = TempDir::new().unwrap();
    let (engine, downloader) = downloader_with(PageScript::default(), &dir);

    let result = downloader.test_login(Site::Freepik).await;

    assert_eq!(result, Some(true));
    let ops = engine.ops();
    assert!(ops.contains(&"goto:https://www.freepik.com/login".to_string()));
    assert!(
        !ops.iter().any(|op| op.starts_with("download_via")),
        "self-test must not trigger a download"
    );
}

#[tokio::test]
async fn test_login_reports_not_configured_as_none() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    config.freepik = None;
    let engine = Arc::new(MockEngine::new(PageScript::default()));
    let downloader = Downloader::new(engine.clone(), &config);

    assert_eq!(downloader.test_login(Site::Freepik).await, None);
    assert_eq!(engine.launch_count(), 0);
}

#[tokio::test]
async fn test_login_reports_failure() {
    let dir = TempDir::new().unwrap();
    let script = PageScript {
        fail_navigation: true,
        ..PageScript::default()
    };
    let (_engine, downloader) = downloader_with(script, &dir);

    assert_eq!(downloader.test_login(Site::Freepik).await, Some(false));
}
