//! Scan orchestration: enumeration, parallel fingerprinting, partitioning.
//!
//! # Overview
//!
//! [`DocumentScanner`] drives the complete pipeline over a directory of
//! scanned documents:
//!
//! 1. **Enumerate** candidate documents, or accept a pre-collected list;
//!    no particular order is assumed.
//! 2. **Fingerprint** each document on a fixed-size rayon pool. Workers
//!    share no mutable state beyond the append-only index; a corrupt
//!    document fails in isolation and never blocks the batch.
//! 3. **Insert** completed records into the [`FingerprintIndex`] as workers
//!    finish. Partial records are never inserted.
//! 4. **Partition** the closed index into exact and near-duplicate groups.
//!
//! Output group order is fixed by the deterministic sorts in the index and
//! partitioner, never by worker completion order. Per-document failures are
//! collected into the outcome's failure list; only configuration problems
//! and interruption abort a scan.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{ConfigError, ScanConfig};
use crate::fingerprint::{FingerprintError, Fingerprinter};
use crate::index::FingerprintIndex;
use crate::partition::{partition, DuplicateGroup, PartitionConfig};
use crate::progress::ProgressCallback;
use crate::render::{PageRasterizer, RenderError};

/// File extensions treated as scanned documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "png", "tif", "tiff", "bmp", "gif", "webp"];

/// What kind of per-document failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Document bytes could not be read; the document was excluded from the
    /// batch entirely.
    Read,
    /// The first page could not be rasterized; the document still
    /// participates in exact-duplicate detection.
    Render,
}

/// A per-document failure, recovered locally and reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    /// Document the failure applies to
    pub path: PathBuf,
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable cause
    pub message: String,
}

impl ScanFailure {
    fn read(path: PathBuf, err: &FingerprintError) -> Self {
        Self {
            path,
            kind: FailureKind::Read,
            message: err.to_string(),
        }
    }

    fn render(path: PathBuf, err: &RenderError) -> Self {
        Self {
            path,
            kind: FailureKind::Render,
            message: err.to_string(),
        }
    }
}

/// Errors that abort a scan before or during processing.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan was interrupted by a shutdown signal.
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Summary statistics from a scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    /// Documents discovered for processing
    pub total_documents: usize,
    /// Documents successfully fingerprinted
    pub fingerprinted: usize,
    /// Fingerprinted documents carrying a visual code
    pub codable_documents: usize,
    /// Documents excluded because their bytes could not be read
    pub read_failures: usize,
    /// Documents whose first page could not be rendered
    pub render_failures: usize,
    /// Exact duplicate groups found
    pub exact_groups: usize,
    /// Near-duplicate groups found
    pub near_groups: usize,
    /// Total documents reported as duplicates (excluding representatives)
    pub duplicate_documents: usize,
    /// Wall-clock duration of the scan in milliseconds
    pub duration_ms: u128,
}

/// Result of a completed scan: the duplicate partition plus everything the
/// report renderer needs.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Exact groups ordered by representative path, then near groups ordered
    /// by representative path
    pub groups: Vec<DuplicateGroup>,
    /// Per-document failures, ordered by path
    pub failures: Vec<ScanFailure>,
    /// Summary statistics
    pub summary: ScanSummary,
}

/// Orchestrates the duplicate-detection pipeline.
///
/// # Example
///
/// ```no_run
/// use scandupe::config::ScanConfig;
/// use scandupe::pipeline::DocumentScanner;
/// use scandupe::render::ImageFileRasterizer;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let scanner = DocumentScanner::new(
///     ScanConfig::default().with_worker_count(4),
///     Arc::new(ImageFileRasterizer),
/// ).unwrap();
///
/// let outcome = scanner.scan(Path::new("/archive/scans")).unwrap();
/// println!("{} duplicate groups", outcome.groups.len());
/// ```
pub struct DocumentScanner {
    config: ScanConfig,
    fingerprinter: Arc<Fingerprinter>,
    rasterizer: Arc<dyn PageRasterizer>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl DocumentScanner {
    /// Create a scanner, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid threshold or worker count;
    /// nothing is processed in that case.
    pub fn new(
        config: ScanConfig,
        rasterizer: Arc<dyn PageRasterizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let fingerprinter = Arc::new(Fingerprinter::new(config.algorithm));
        Ok(Self {
            config,
            fingerprinter,
            rasterizer,
            shutdown_flag: None,
            progress: None,
        })
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Scan a directory of documents for duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the path is missing or not a directory, or
    /// if the scan is interrupted. Per-document failures do not abort the
    /// scan; they are returned in the outcome.
    pub fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        if !path.exists() {
            return Err(ScanError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(ScanError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Scanning {} for duplicate documents", path.display());

        let mut paths = Vec::new();
        let mut failures = Vec::new();
        for entry in walkdir::WalkDir::new(path) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if is_document(entry.path()) {
                        paths.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let failed = e
                        .path()
                        .map_or_else(|| path.to_path_buf(), Path::to_path_buf);
                    log::warn!("Cannot access {}: {}", failed.display(), e);
                    failures.push(ScanFailure {
                        path: failed,
                        kind: FailureKind::Read,
                        message: e.to_string(),
                    });
                }
            }
        }

        self.run(paths, failures)
    }

    /// Scan a pre-collected list of document paths.
    ///
    /// No assumption is made about the order of `paths`; output is
    /// deterministic regardless.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Interrupted`] if a shutdown was requested.
    pub fn scan_files(&self, paths: Vec<PathBuf>) -> Result<ScanOutcome, ScanError> {
        self.run(paths, Vec::new())
    }

    fn run(
        &self,
        paths: Vec<PathBuf>,
        mut failures: Vec<ScanFailure>,
    ) -> Result<ScanOutcome, ScanError> {
        let start = std::time::Instant::now();
        let total_documents = paths.len();

        if self.is_shutdown_requested() {
            return Err(ScanError::Interrupted);
        }

        log::info!(
            "Fingerprinting {} documents on {} workers ({} codes)",
            total_documents,
            self.config.worker_count,
            self.fingerprinter.algorithm()
        );

        if let Some(ref callback) = self.progress {
            callback.on_phase_start("fingerprint", total_documents);
        }

        let index = FingerprintIndex::new();
        let collected_failures = Mutex::new(Vec::new());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build worker pool ({e}), using global pool");
                rayon::ThreadPoolBuilder::new().build().expect("rayon pool")
            });

        pool.install(|| {
            paths.into_par_iter().enumerate().for_each(|(idx, path)| {
                // Abandoned documents are skipped whole; a partial record is
                // never inserted.
                if self.is_shutdown_requested() {
                    return;
                }

                if let Some(ref callback) = self.progress {
                    callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                }

                let (bitmap, render_err) = match self.rasterizer.rasterize_first_page(&path) {
                    Ok(bitmap) => (Some(bitmap), None),
                    Err(e) => {
                        log::debug!("Render failed for {}: {}", path.display(), e);
                        (None, Some(e))
                    }
                };

                match self.fingerprinter.fingerprint(&path, bitmap.as_ref()) {
                    Ok(record) => {
                        if let Some(ref callback) = self.progress {
                            callback.on_item_completed(record.size_bytes);
                        }
                        // Render failure is a partial-capability condition:
                        // the record still enters exact-duplicate detection.
                        if let Some(e) = render_err {
                            collected_failures
                                .lock()
                                .expect("failure list lock poisoned")
                                .push(ScanFailure::render(path, &e));
                        }
                        index.insert(record);
                    }
                    Err(e) => {
                        log::warn!("Excluding {}: {}", path.display(), e);
                        collected_failures
                            .lock()
                            .expect("failure list lock poisoned")
                            .push(ScanFailure::read(path, &e));
                    }
                }
            });
        });

        if let Some(ref callback) = self.progress {
            callback.on_phase_end("fingerprint");
        }

        if self.is_shutdown_requested() {
            return Err(ScanError::Interrupted);
        }

        failures.extend(
            collected_failures
                .into_inner()
                .expect("failure list lock poisoned"),
        );
        // Worker completion order leaks into the failure list; sort it out.
        failures.sort_by(|a, b| a.path.cmp(&b.path));

        let mut summary = ScanSummary {
            total_documents,
            fingerprinted: index.len(),
            read_failures: failures
                .iter()
                .filter(|f| f.kind == FailureKind::Read)
                .count(),
            render_failures: failures
                .iter()
                .filter(|f| f.kind == FailureKind::Render)
                .count(),
            ..Default::default()
        };

        if let Some(ref callback) = self.progress {
            callback.on_phase_start("partition", 0);
            callback.on_message("clustering fingerprints");
        }

        let closed = index.close();
        summary.codable_documents = closed.codable_records().len();

        let partition_config = PartitionConfig {
            threshold: self.config.effective_threshold(),
            cluster_mode: self.config.cluster_mode,
            pairwise_warn_ceiling: self.config.pairwise_warn_ceiling,
        };
        let (groups, stats) = partition(&closed, &partition_config);

        if let Some(ref callback) = self.progress {
            callback.on_phase_end("partition");
        }

        summary.exact_groups = stats.exact_groups;
        summary.near_groups = stats.near_groups;
        summary.duplicate_documents = stats.exact_duplicates + stats.near_duplicates;
        summary.duration_ms = start.elapsed().as_millis();

        log::info!(
            "Scan complete in {} ms: {} exact groups, {} near groups, {} duplicates, {} failures",
            summary.duration_ms,
            summary.exact_groups,
            summary.near_groups,
            summary.duplicate_documents,
            failures.len()
        );

        Ok(ScanOutcome {
            groups,
            failures,
            summary,
        })
    }
}

/// Check whether a path looks like a scannable document.
fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            DOCUMENT_EXTENSIONS.iter().any(|&d| d == ext)
        })
}
