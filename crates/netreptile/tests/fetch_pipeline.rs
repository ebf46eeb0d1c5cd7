//! Fetch pipeline tests against the in-memory fixture renderer.

use std::time::Duration;

use netreptile::config::{self, CliOverrides, EffectiveConfig};
use netreptile::{
    fetch, fetch_and_shutdown, FetchRequest, FixtureRenderer, PayloadKind, SelectorType,
};
use reptile_core::ReptileError;
use tempfile::TempDir;

// ── helpers ──

const PAGE: &str = r#"<html><head><title>Forum</title></head><body>
    <div class="post">  First post  </div>
    <div class="post">Second post</div>
    <div class="post">   </div>
    <div class="post">Third post</div>
</body></html>"#;

fn request(dir: &TempDir, config: EffectiveConfig) -> FetchRequest {
    FetchRequest {
        url: "forum.example".to_string(),
        output_path: dir.path().join("out.txt"),
        config,
    }
}

fn with_selector(selector: &str) -> EffectiveConfig {
    EffectiveConfig {
        selector: Some(selector.to_string()),
        ..Default::default()
    }
}

fn read(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("out.txt")).unwrap()
}

// ── tests ──

#[tokio::test]
async fn test_full_document_without_selector() {
    let dir = TempDir::new().unwrap();
    let outcome = fetch(&FixtureRenderer::new(PAGE), &request(&dir, EffectiveConfig::default()))
        .await
        .unwrap();

    assert_eq!(outcome.url, "https://forum.example");
    assert_eq!(outcome.kind, PayloadKind::Document);
    assert_eq!(read(&dir), PAGE);
}

#[tokio::test]
async fn test_selector_texts_joined_by_blank_line() {
    let dir = TempDir::new().unwrap();
    let outcome = fetch(&FixtureRenderer::new(PAGE), &request(&dir, with_selector(".post")))
        .await
        .unwrap();

    assert_eq!(outcome.kind, PayloadKind::Selector { matches: 3 });
    assert_eq!(read(&dir), "First post\n\nSecond post\n\nThird post");
}

#[tokio::test]
async fn test_zero_matches_writes_empty_file() {
    let dir = TempDir::new().unwrap();
    let outcome = fetch(&FixtureRenderer::new(PAGE), &request(&dir, with_selector(".comment")))
        .await
        .unwrap();

    assert_eq!(outcome.kind, PayloadKind::Selector { matches: 0 });
    assert_eq!(outcome.bytes, 0);
    assert_eq!(read(&dir), "");
}

#[tokio::test]
async fn test_navigation_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let err = fetch(
        &FixtureRenderer::failing("net::ERR_NAME_NOT_RESOLVED"),
        &request(&dir, EffectiveConfig::default()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReptileError::Navigation(_)));
    assert!(!dir.path().join("out.txt").exists());
}

#[tokio::test]
async fn test_timeout_is_navigation_error() {
    let dir = TempDir::new().unwrap();
    let renderer = FixtureRenderer::new(PAGE).with_delay(Duration::from_millis(500));
    let config = EffectiveConfig {
        timeout_ms: 20,
        ..Default::default()
    };

    let err = fetch(&renderer, &request(&dir, config)).await.unwrap_err();
    assert!(matches!(err, ReptileError::Navigation(_)));
    assert!(!dir.path().join("out.txt").exists());
}

#[tokio::test]
async fn test_unwritable_output_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut req = request(&dir, EffectiveConfig::default());
    req.output_path = dir.path().join("missing").join("out.txt");

    let err = fetch(&FixtureRenderer::new(PAGE), &req).await.unwrap_err();
    assert!(matches!(err, ReptileError::Io { .. }));
}

#[tokio::test]
async fn test_config_file_drives_selector_list_and_baseurl() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("site.json");
    std::fs::write(
        &config_path,
        r#"{
            "baseurl": "https://forum.example/",
            "selectors": [
                { "selector": "title", "separator": "\n\n" },
                { "selector": ".post" }
            ]
        }"#,
    )
    .unwrap();

    let cfg = config::resolve_from_path(Some(&config_path), &CliOverrides::default()).unwrap();
    let mut req = request(&dir, cfg);
    req.url = "/thread/7".to_string();

    let outcome = fetch(&FixtureRenderer::new(PAGE), &req).await.unwrap();
    assert_eq!(outcome.url, "https://forum.example/thread/7");
    assert_eq!(outcome.kind, PayloadKind::SelectorList);
    assert_eq!(read(&dir), "Forum\n\n\nFirst post\nSecond post\nThird post");
}

#[tokio::test]
async fn test_cli_selector_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("site.json");
    std::fs::write(&config_path, r#"{"selector": "title", "timeout": 5000}"#).unwrap();

    let cli = CliOverrides {
        selector: Some(".post".to_string()),
        selector_type: Some(SelectorType::Css),
        ..Default::default()
    };
    let cfg = config::resolve_from_path(Some(&config_path), &cli).unwrap();
    assert_eq!(cfg.timeout_ms, 5000);

    fetch(&FixtureRenderer::new(PAGE), &request(&dir, cfg)).await.unwrap();
    assert!(read(&dir).starts_with("First post"));
}

#[tokio::test]
async fn test_cancelled_fetch_shuts_renderer_down_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let renderer = FixtureRenderer::new(PAGE).with_delay(Duration::from_secs(30));

    let outcome = fetch_and_shutdown(&renderer, &request(&dir, EffectiveConfig::default()), async {})
        .await
        .unwrap();

    assert_eq!(outcome, None);
    assert_eq!(renderer.shutdown_count(), 1);
    assert!(!dir.path().join("out.txt").exists());
}

#[tokio::test]
async fn test_completed_fetch_shuts_renderer_down() {
    let dir = TempDir::new().unwrap();
    let renderer = FixtureRenderer::new(PAGE);

    let outcome = fetch_and_shutdown(
        &renderer,
        &request(&dir, with_selector(".post")),
        std::future::pending::<()>(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome.kind, PayloadKind::Selector { matches: 3 });
    assert_eq!(renderer.shutdown_count(), 1);
    assert!(read(&dir).starts_with("First post"));
}

#[tokio::test]
async fn test_failed_fetch_still_shuts_renderer_down() {
    let dir = TempDir::new().unwrap();
    let renderer = FixtureRenderer::failing("net::ERR_CONNECTION_REFUSED");

    let err = fetch_and_shutdown(
        &renderer,
        &request(&dir, EffectiveConfig::default()),
        std::future::pending::<()>(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReptileError::Navigation(_)));
    assert_eq!(renderer.shutdown_count(), 1);
}
