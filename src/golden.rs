//! The golden-test harness: byte-exact regression checks.
//!
//! A versioned JSON catalog lists named cases, each pointing at a DSL
//! fixture plus expected artifacts per pipeline stage. Every stage is
//! judged independently and byte-for-byte, so a case can pass its
//! compile stage while failing one backend - isolating a regression to a
//! specific stage without masking partial success. Missing fixture files
//! make a stage *skipped*, which is distinct from a mismatch, and no
//! case failure ever aborts the run.

use crate::error::PipelineError;
use crate::pipeline::{OutputFormat, Pipeline};
use easel_model::Deck;
use easel_render_core::RenderOptions;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The catalog format version this harness understands.
pub const CATALOG_VERSION: u32 = 1;

/// Stage name for the compile-to-intermediate comparison.
pub const STAGE_XML: &str = "xml";

/// A versioned catalog of golden test cases.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub version: u32,
    pub cases: Vec<CaseSpec>,
}

/// One golden case: an input fixture plus a map of stage name to
/// expected-artifact path. Paths are relative to the catalog file.
#[derive(Debug, Deserialize)]
pub struct CaseSpec {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub input: PathBuf,
    #[serde(default)]
    pub stages: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: String,
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub category: String,
    pub stages: Vec<StageResult>,
}

/// Accumulated outcome of a full harness run.
#[derive(Debug, Default)]
pub struct HarnessReport {
    pub cases: Vec<CaseReport>,
}

impl HarnessReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, StageOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, StageOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, StageOutcome::Skipped(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&StageOutcome) -> bool) -> usize {
        self.cases
            .iter()
            .flat_map(|c| &c.stages)
            .filter(|s| pred(&s.outcome))
            .count()
    }
}

impl fmt::Display for HarnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} case(s): {} stage(s) passed, {} failed, {} skipped",
            self.cases.len(),
            self.passed(),
            self.failed(),
            self.skipped()
        )?;
        for case in &self.cases {
            for stage in &case.stages {
                match &stage.outcome {
                    StageOutcome::Passed => {}
                    StageOutcome::Failed(detail) => {
                        writeln!(f, "  FAIL {} [{}]: {}", case.name, stage.stage, detail)?
                    }
                    StageOutcome::Skipped(reason) => {
                        writeln!(f, "  SKIP {} [{}]: {}", case.name, stage.stage, reason)?
                    }
                }
            }
        }
        Ok(())
    }
}

/// Drives the pipeline against a fixture catalog.
pub struct GoldenHarness {
    pipeline: Arc<Pipeline>,
    base_dir: PathBuf,
    options: RenderOptions,
}

impl GoldenHarness {
    pub fn new(pipeline: Arc<Pipeline>, base_dir: PathBuf) -> Self {
        Self {
            pipeline,
            base_dir,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads and version-checks a catalog file; the catalog's directory
    /// becomes the base for fixture paths.
    pub fn load_catalog(path: &Path) -> Result<Catalog, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        if catalog.version != CATALOG_VERSION {
            return Err(PipelineError::Catalog(format!(
                "unsupported catalog version {} (expected {})",
                catalog.version, CATALOG_VERSION
            )));
        }
        Ok(catalog)
    }

    /// Runs every case, accumulating per-stage outcomes. Single-case
    /// failures never abort the run.
    pub fn run(&self, catalog: &Catalog) -> HarnessReport {
        let mut report = HarnessReport::default();
        for case in &catalog.cases {
            report.cases.push(self.run_case(case));
        }
        info!(
            "[GOLDEN] {} passed, {} failed, {} skipped",
            report.passed(),
            report.failed(),
            report.skipped()
        );
        report
    }

    fn run_case(&self, case: &CaseSpec) -> CaseReport {
        debug!("[GOLDEN] case '{}'", case.name);
        let mut stages = Vec::new();

        let input_path = self.base_dir.join(&case.input);
        let source = match std::fs::read_to_string(&input_path) {
            Ok(source) => source,
            Err(e) => {
                // Missing input: every listed stage is skipped, not failed.
                for stage in case.stages.keys() {
                    stages.push(StageResult {
                        stage: stage.clone(),
                        outcome: StageOutcome::Skipped(format!(
                            "input fixture {} unreadable: {}",
                            input_path.display(),
                            e
                        )),
                    });
                }
                return CaseReport {
                    name: case.name.clone(),
                    category: case.category.clone(),
                    stages,
                };
            }
        };

        let compiled = self.pipeline.compile(&source);

        for (stage, expected_rel) in &case.stages {
            let expected_path = self.base_dir.join(expected_rel);
            let outcome = self.run_stage(stage, &compiled, &expected_path);
            stages.push(StageResult { stage: stage.clone(), outcome });
        }

        CaseReport {
            name: case.name.clone(),
            category: case.category.clone(),
            stages,
        }
    }

    fn run_stage(
        &self,
        stage: &str,
        compiled: &Result<String, PipelineError>,
        expected_path: &Path,
    ) -> StageOutcome {
        let xml = match compiled {
            Ok(xml) => xml,
            Err(e) => return StageOutcome::Failed(format!("compile stage failed: {}", e)),
        };

        let produced = if stage == STAGE_XML {
            Ok(xml.clone().into_bytes())
        } else {
            match OutputFormat::from_name(stage) {
                Some(format) => Deck::parse(xml)
                    .map_err(PipelineError::from)
                    .and_then(|deck| self.pipeline.render_deck(&deck, format, &self.options)),
                None => return StageOutcome::Skipped(format!("unknown stage '{}'", stage)),
            }
        };

        let produced = match produced {
            Ok(bytes) => bytes,
            Err(e) => return StageOutcome::Failed(e.to_string()),
        };

        let expected = match std::fs::read(expected_path) {
            Ok(bytes) => bytes,
            Err(_) => {
                return StageOutcome::Skipped(format!(
                    "fixture {} missing",
                    expected_path.display()
                ));
            }
        };

        compare_bytes(&produced, &expected)
    }
}

/// Byte-exact comparison with a concise diff indicator - never a full
/// diff dump.
fn compare_bytes(produced: &[u8], expected: &[u8]) -> StageOutcome {
    match first_mismatch(produced, expected) {
        None => StageOutcome::Passed,
        Some(offset) => StageOutcome::Failed(format!(
            "output differs from fixture at byte {} (got {} bytes, expected {}); \
             re-record the fixture if the change is intentional",
            offset,
            produced.len(),
            expected.len()
        )),
    }
}

/// Offset of the first differing byte, or `None` when equal.
fn first_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    if a == b {
        return None;
    }
    Some(
        a.iter()
            .zip(b.iter())
            .position(|(x, y)| x != y)
            .unwrap_or_else(|| a.len().min(b.len())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_mismatch() {
        assert_eq!(first_mismatch(b"abc", b"abc"), None);
        assert_eq!(first_mismatch(b"abc", b"abd"), Some(2));
        assert_eq!(first_mismatch(b"abc", b"ab"), Some(2));
        assert_eq!(first_mismatch(b"", b"x"), Some(0));
    }

    #[test]
    fn test_compare_bytes_outcomes() {
        assert_eq!(compare_bytes(b"same", b"same"), StageOutcome::Passed);
        assert!(matches!(
            compare_bytes(b"one", b"two"),
            StageOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_catalog_version_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"version": 2, "cases": []}"#).unwrap();
        let err = GoldenHarness::load_catalog(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Catalog(_)));
    }

    #[test]
    fn test_catalog_deserializes() {
        let raw = r#"{
            "version": 1,
            "cases": [
                {
                    "name": "hello",
                    "category": "text",
                    "input": "hello.dsh",
                    "stages": {"xml": "hello.xml", "svg": "hello.svg"}
                }
            ]
        }"#;
        let catalog: Catalog = serde_json::from_str(raw).unwrap();
        assert_eq!(catalog.version, 1);
        assert_eq!(catalog.cases[0].stages.len(), 2);
    }
}
