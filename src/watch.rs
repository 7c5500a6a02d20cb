//! The continuous file watcher.
//!
//! A single polling loop walks the configured roots on a fixed interval.
//! Every DSL file whose modification time falls inside the freshness
//! window is claimed with insert-if-absent semantics on a shared
//! in-flight set (at most one render per path at a time) and handed to a
//! background task. The task compiles once and fans out to every
//! requested format independently: one format's failure is logged and
//! skipped while its siblings proceed. Shutdown is cooperative - the
//! signal stops new scans, and already-started tasks get a bounded grace
//! period before the watcher gives up on them.

use crate::error::PipelineError;
use crate::pipeline::{default_output_path, OutputFormat, Pipeline, DSL_EXTENSION};
use easel_model::Deck;
use easel_render_core::RenderOptions;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Watcher configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Filesystem roots scanned on every poll.
    pub roots: Vec<PathBuf>,
    /// Output formats produced for each fresh file.
    pub formats: Vec<OutputFormat>,
    /// Render options applied to every output.
    pub options: RenderOptions,
    pub poll_interval: Duration,
    /// A file is picked up only while its mtime is inside this window.
    pub freshness: Duration,
    /// Grace period for in-flight renders during shutdown.
    pub shutdown_timeout: Duration,
}

impl WatchConfig {
    pub fn new(roots: Vec<PathBuf>, formats: Vec<OutputFormat>) -> Self {
        Self {
            roots,
            formats,
            options: RenderOptions::default(),
            poll_interval: Duration::from_secs(2),
            freshness: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Creates the cooperative shutdown channel for [`Watcher::run`].
/// Send `true` (or drop the sender) to stop the watcher.
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Clears the in-flight mark when a per-file task finishes, success or
/// failure alike.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<PathBuf>>>,
    path: PathBuf,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.path);
        }
    }
}

/// The polling file watcher.
pub struct Watcher {
    pipeline: Arc<Pipeline>,
    config: WatchConfig,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Watcher {
    pub fn new(pipeline: Arc<Pipeline>, config: WatchConfig) -> Self {
        Self {
            pipeline,
            config,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Runs the polling loop until the shutdown signal fires, then waits
    /// for in-flight renders with a bounded timeout.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        let mut tasks = JoinSet::new();
        info!(
            "[WATCH] watching {} root(s) for *.{} ({} format(s))",
            self.config.roots.len(),
            DSL_EXTENSION,
            self.config.formats.len()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan(&mut tasks);
                    // Reap finished tasks so the set does not grow.
                    while tasks.try_join_next().is_some() {}
                }
                changed = shutdown.changed() => {
                    match changed {
                        Ok(()) if !*shutdown.borrow() => continue,
                        _ => break,
                    }
                }
            }
        }

        info!(
            "[WATCH] shutdown requested, waiting for {} in-flight render(s)",
            tasks.len()
        );
        let deadline = Instant::now() + self.config.shutdown_timeout;
        while !tasks.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(
                    "[WATCH] shutdown timeout reached with {} task(s) still running",
                    tasks.len()
                );
                tasks.abort_all();
                break;
            }
            match tokio::time::timeout(remaining, tasks.join_next()).await {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "[WATCH] shutdown timeout reached with {} task(s) still running",
                        tasks.len()
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }
        info!("[WATCH] stopped");
    }

    /// One poll cycle: walk the roots and dispatch every fresh,
    /// not-yet-in-flight DSL file.
    fn scan(&self, tasks: &mut JoinSet<()>) {
        for root in &self.config.roots {
            let mut files = Vec::new();
            collect_dsl_files(root, &mut files);
            for path in files {
                if !is_fresh(&path, self.config.freshness) {
                    continue;
                }
                // Insert-if-absent is the claim; losing the race means
                // another task already renders this path.
                let claimed = self
                    .in_flight
                    .lock()
                    .map(|mut set| set.insert(path.clone()))
                    .unwrap_or(false);
                if !claimed {
                    continue;
                }

                debug!("[WATCH] dispatching {}", path.display());
                let pipeline = Arc::clone(&self.pipeline);
                let formats = self.config.formats.clone();
                let options = self.config.options.clone();
                let guard = InFlightGuard {
                    set: Arc::clone(&self.in_flight),
                    path: path.clone(),
                };
                tasks.spawn(async move {
                    let _guard = guard;
                    let result = tokio::task::spawn_blocking(move || {
                        process_file(&pipeline, &path, &formats, &options)
                    })
                    .await;
                    if let Err(e) = result {
                        warn!("[WATCH] render task panicked: {}", e);
                    }
                });
            }
        }
    }
}

/// Compiles a file once, then fans out to every requested format.
/// Failures are contained per format.
fn process_file(
    pipeline: &Pipeline,
    path: &Path,
    formats: &[OutputFormat],
    options: &RenderOptions,
) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            warn!("[WATCH] failed to read {}: {}", path.display(), e);
            return;
        }
    };

    let xml = match pipeline.compile(&source) {
        Ok(xml) => xml,
        Err(e) => {
            warn!("[WATCH] compile failed for {}: {}", path.display(), e);
            return;
        }
    };
    let deck = match Deck::parse(&xml) {
        Ok(deck) => deck,
        Err(e) => {
            warn!("[WATCH] parse failed for {}: {}", path.display(), e);
            return;
        }
    };

    for format in formats {
        let result: Result<(), PipelineError> = (|| {
            let bytes = if *format == OutputFormat::Xml {
                xml.clone().into_bytes()
            } else {
                pipeline.render_deck(&deck, *format, options)?
            };
            let out = default_output_path(path, *format);
            std::fs::write(&out, bytes)?;
            info!("[WATCH] wrote {}", out.display());
            Ok(())
        })();
        if let Err(e) = result {
            // Contained: this format is skipped, siblings proceed.
            warn!("[WATCH] {} output failed for {}: {}", format, path.display(), e);
        }
    }
}

/// Recursively collects `*.dsh` files under `root`.
fn collect_dsl_files(root: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("[WATCH] cannot read {}: {}", root.display(), e);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_dsl_files(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some(DSL_EXTENSION) {
            out.push(path);
        }
    }
}

/// True when the file's mtime falls inside the freshness window.
fn is_fresh(path: &Path, freshness: Duration) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|mtime| mtime.elapsed().ok())
        .map(|age| age <= freshness)
        .unwrap_or(false)
}
