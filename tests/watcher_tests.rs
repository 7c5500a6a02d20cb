//! File-watcher behavior: format fan-out, artifact placement, shutdown.

mod common;

use common::{test_pipeline, HELLO_DECK};
use easel::{shutdown_channel, OutputFormat, WatchConfig, Watcher};
use std::time::Duration;

fn fast_config(root: std::path::PathBuf, formats: Vec<OutputFormat>) -> WatchConfig {
    let mut config = WatchConfig::new(vec![root], formats);
    config.poll_interval = Duration::from_millis(50);
    config.freshness = Duration::from_secs(60);
    config.shutdown_timeout = Duration::from_secs(5);
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_produces_exactly_the_requested_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("talk.dsh"), HELLO_DECK).unwrap();
    // A non-DSL neighbor must be left alone.
    std::fs::write(dir.path().join("notes.txt"), "not a deck").unwrap();

    let config = fast_config(
        dir.path().to_path_buf(),
        vec![OutputFormat::Svg, OutputFormat::Png],
    );
    let watcher = Watcher::new(test_pipeline(), config);
    let (tx, rx) = shutdown_channel();
    let handle = tokio::spawn(watcher.run(rx));

    let svg = dir.path().join("talk.svg");
    let png = dir.path().join("talk.png");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while (!svg.exists() || !png.exists()) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    tx.send(true).unwrap();
    handle.await.unwrap();

    assert!(svg.exists(), "svg artifact missing");
    assert!(png.exists(), "png artifact missing");
    assert!(!dir.path().join("talk.pdf").exists(), "unrequested pdf artifact");
    assert!(!dir.path().join("notes.svg").exists(), "non-DSL neighbor touched");

    let svg_content = std::fs::read_to_string(&svg).unwrap();
    assert!(svg_content.contains("Hello World"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_format_does_not_block_siblings() {
    // An unparseable deck fails every render; the watcher must survive
    // and keep polling (and a good file processed in the same run must
    // still produce its outputs).
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.dsh"), "<deck><canvas width=\"0\"/></deck>").unwrap();
    std::fs::write(dir.path().join("fine.dsh"), HELLO_DECK).unwrap();

    let config = fast_config(dir.path().to_path_buf(), vec![OutputFormat::Svg]);
    let watcher = Watcher::new(test_pipeline(), config);
    let (tx, rx) = shutdown_channel();
    let handle = tokio::spawn(watcher.run(rx));

    let fine = dir.path().join("fine.svg");
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while !fine.exists() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    tx.send(true).unwrap();
    handle.await.unwrap();

    assert!(fine.exists(), "good file should render despite the broken one");
    assert!(!dir.path().join("broken.svg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_terminates_idle_watcher() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path().to_path_buf(), vec![OutputFormat::Svg]);
    let watcher = Watcher::new(test_pipeline(), config);
    let (tx, rx) = shutdown_channel();
    let handle = tokio::spawn(watcher.run(rx));

    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("watcher did not stop after shutdown signal")
        .unwrap();
}
