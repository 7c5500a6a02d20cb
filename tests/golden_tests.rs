//! Golden-test harness behavior: byte-exact comparison, stage isolation,
//! skip-versus-fail reporting.

mod common;

use common::{test_pipeline, HELLO_DECK};
use easel::{GoldenHarness, OutputFormat, RenderOptions, StageOutcome};
use std::path::Path;

/// Records fixtures for one case by running the pipeline itself, then
/// writes a version-1 catalog pointing at them.
fn record_case(dir: &Path) -> std::path::PathBuf {
    let pipeline = test_pipeline();
    std::fs::write(dir.join("hello.dsh"), HELLO_DECK).unwrap();

    let xml = pipeline.compile(HELLO_DECK).unwrap();
    std::fs::write(dir.join("hello.xml"), &xml).unwrap();

    for format in [OutputFormat::Svg, OutputFormat::Png, OutputFormat::Pdf] {
        let bytes = pipeline
            .render(HELLO_DECK, format, &RenderOptions::default())
            .unwrap();
        std::fs::write(dir.join(format!("hello.{}", format.extension())), bytes).unwrap();
    }

    let catalog = r#"{
        "version": 1,
        "cases": [
            {
                "name": "hello",
                "category": "text",
                "input": "hello.dsh",
                "stages": {
                    "xml": "hello.xml",
                    "svg": "hello.svg",
                    "png": "hello.png",
                    "pdf": "hello.pdf"
                }
            }
        ]
    }"#;
    let path = dir.join("catalog.json");
    std::fs::write(&path, catalog).unwrap();
    path
}

#[test]
fn test_intact_catalog_reports_zero_failures() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = record_case(dir.path());

    let catalog = GoldenHarness::load_catalog(&catalog_path).unwrap();
    let harness = GoldenHarness::new(test_pipeline(), dir.path().to_path_buf());
    let report = harness.run(&catalog);

    assert!(report.is_success(), "report: {report}");
    assert_eq!(report.passed(), 4);
    assert_eq!(report.skipped(), 0);
}

#[test]
fn test_corrupted_fixture_fails_only_its_stage() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = record_case(dir.path());
    std::fs::write(dir.path().join("hello.svg"), b"corrupted").unwrap();

    let catalog = GoldenHarness::load_catalog(&catalog_path).unwrap();
    let harness = GoldenHarness::new(test_pipeline(), dir.path().to_path_buf());
    let report = harness.run(&catalog);

    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 3);

    let case = &report.cases[0];
    for stage in &case.stages {
        match stage.stage.as_str() {
            "svg" => match &stage.outcome {
                StageOutcome::Failed(detail) => {
                    assert!(detail.contains("byte"), "diff indicator missing: {detail}");
                    assert!(detail.contains("re-record"), "remediation missing: {detail}");
                }
                other => panic!("svg stage should fail, got {other:?}"),
            },
            _ => assert_eq!(stage.outcome, StageOutcome::Passed, "stage {}", stage.stage),
        }
    }
}

#[test]
fn test_missing_fixture_is_skipped_not_failed() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = record_case(dir.path());
    std::fs::remove_file(dir.path().join("hello.png")).unwrap();

    let catalog = GoldenHarness::load_catalog(&catalog_path).unwrap();
    let harness = GoldenHarness::new(test_pipeline(), dir.path().to_path_buf());
    let report = harness.run(&catalog);

    assert!(report.is_success());
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.passed(), 3);
}

#[test]
fn test_missing_input_skips_every_stage() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = record_case(dir.path());
    std::fs::remove_file(dir.path().join("hello.dsh")).unwrap();

    let catalog = GoldenHarness::load_catalog(&catalog_path).unwrap();
    let harness = GoldenHarness::new(test_pipeline(), dir.path().to_path_buf());
    let report = harness.run(&catalog);

    assert!(report.is_success());
    assert_eq!(report.skipped(), 4);
    assert_eq!(report.passed(), 0);
}

#[test]
fn test_run_continues_past_failing_case() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.dsh"), "<deck><canvas width=\"0\"/></deck>").unwrap();
    std::fs::write(dir.path().join("bad.svg"), b"whatever").unwrap();
    std::fs::write(dir.path().join("good.dsh"), HELLO_DECK).unwrap();

    let pipeline = test_pipeline();
    let good_svg = pipeline
        .render(HELLO_DECK, OutputFormat::Svg, &RenderOptions::default())
        .unwrap();
    std::fs::write(dir.path().join("good.svg"), good_svg).unwrap();

    let catalog_json = r#"{
        "version": 1,
        "cases": [
            {"name": "bad", "input": "bad.dsh", "stages": {"svg": "bad.svg"}},
            {"name": "good", "input": "good.dsh", "stages": {"svg": "good.svg"}}
        ]
    }"#;
    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, catalog_json).unwrap();

    let catalog = GoldenHarness::load_catalog(&catalog_path).unwrap();
    let harness = GoldenHarness::new(pipeline, dir.path().to_path_buf());
    let report = harness.run(&catalog);

    // The bad case fails its render stage; the good one still passes.
    assert_eq!(report.cases.len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 1);
}
