//! scandupe - exact and near-duplicate detection for scanned documents.
//!
//! scandupe fingerprints every document in a directory with a BLAKE3
//! content digest and a perceptual code of its rendered first page, then
//! partitions the collection into byte-identical duplicate groups and
//! visually near-identical clusters.
//!
//! # Architecture
//!
//! - [`fingerprint`] - content digests, perceptual codes, document records
//! - [`render`] - first-page rasterization behind the [`render::PageRasterizer`] trait
//! - [`index`] - thread-safe fingerprint accumulation and the closed snapshot
//! - [`partition`] - exact and near-duplicate grouping with deterministic ordering
//! - [`pipeline`] - the end-to-end scan orchestrator
//! - [`report`] - text and JSON report rendering
//!
//! # Example
//!
//! ```no_run
//! use scandupe::config::ScanConfig;
//! use scandupe::pipeline::DocumentScanner;
//! use scandupe::render::ImageFileRasterizer;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = ScanConfig::default();
//! let scanner = DocumentScanner::new(config, Arc::new(ImageFileRasterizer))?;
//! let outcome = scanner.scan(Path::new("/archive/scans"))?;
//! for group in &outcome.groups {
//!     println!("{:?}: {} documents", group.kind, group.len());
//! }
//! # Ok::<(), scandupe::pipeline::ScanError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod logging;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod report;
pub mod signal;

use std::io::Write as _;
use std::sync::Arc;

use crate::cli::{Cli, OutputFormat};
use crate::config::ScanConfig;
use crate::error::ExitCode;
use crate::pipeline::{DocumentScanner, ScanError};
use crate::progress::Progress;
use crate::render::ImageFileRasterizer;

/// Runs the full scan from parsed CLI arguments and returns the exit code.
///
/// Fatal setup failures (signal handler installation, report I/O) are
/// returned as errors; scan-level failures are folded into the exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = ScanConfig::default()
        .with_worker_count(cli.workers)
        .with_algorithm(cli.algorithm.into())
        .with_cluster_mode(cli.cluster_mode.into())
        .with_thumbnails(cli.include_thumbnails);
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }

    let shutdown = signal::install_handler()?;

    let progress = Progress::new(cli.quiet || cli.output == OutputFormat::Json);

    let scanner = match DocumentScanner::new(config, Arc::new(ImageFileRasterizer)) {
        Ok(scanner) => scanner
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(Arc::new(progress)),
        Err(err) => return Err(err.into()),
    };

    let outcome = match scanner.scan(&cli.path) {
        Ok(outcome) => outcome,
        Err(ScanError::Interrupted) => {
            log::warn!("Scan interrupted before completion");
            return Ok(ExitCode::Interrupted);
        }
        Err(err) => return Err(err.into()),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => report::render_text(&outcome, &mut out)?,
        OutputFormat::Json => report::render_json(&outcome, cli.include_thumbnails, &mut out)?,
    }
    out.flush()?;

    if !outcome.failures.is_empty() {
        Ok(ExitCode::PartialSuccess)
    } else if outcome.groups.is_empty() {
        Ok(ExitCode::NoDuplicates)
    } else {
        Ok(ExitCode::Success)
    }
}
