//! Command-line interface definitions for scandupe.
//!
//! All CLI arguments and options are declared here using the clap derive
//! API.
//!
//! # Example
//!
//! ```bash
//! # Scan a folder of scanned documents
//! scandupe ~/archive/scans
//!
//! # Stricter matching and JSON output for scripting
//! scandupe ~/archive/scans --threshold 3 --output json
//!
//! # Verbose mode for debugging
//! scandupe -v ~/archive/scans
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::fingerprint::PerceptualAlgorithm;
use crate::partition::ClusterMode;

/// Exact and near-duplicate finder for scanned documents.
///
/// scandupe fingerprints every document with a BLAKE3 content digest and a
/// perceptual code of its rendered first page, then reports byte-identical
/// groups and visually near-identical clusters.
#[derive(Debug, Parser)]
#[command(name = "scandupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the scanned documents
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Maximum Hamming distance for near-duplicates (smaller = stricter)
    ///
    /// Defaults to a value tuned for the selected algorithm.
    #[arg(short = 't', long, value_name = "N")]
    pub threshold: Option<u32>,

    /// Number of fingerprinting worker threads
    #[arg(short = 'w', long, value_name = "N", default_value = "4")]
    pub workers: usize,

    /// Perceptual hashing algorithm
    #[arg(long, value_enum, default_value = "dhash")]
    pub algorithm: AlgorithmArg,

    /// Near-duplicate clustering mode
    ///
    /// "transitive" groups by connected components; "first-match" reproduces
    /// the narrower compare-against-recorded-originals behavior.
    #[arg(long, value_enum, default_value = "transitive")]
    pub cluster_mode: ClusterModeArg,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Include thumbnail source references in the report
    #[arg(long)]
    pub include_thumbnails: bool,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Perceptual algorithm choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Difference hash (gradient-based)
    Dhash,
    /// Average hash (mean-based)
    Ahash,
    /// Perceptual hash (DCT-based)
    Phash,
}

impl From<AlgorithmArg> for PerceptualAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Dhash => Self::Dhash,
            AlgorithmArg::Ahash => Self::Ahash,
            AlgorithmArg::Phash => Self::Phash,
        }
    }
}

/// Clustering mode choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClusterModeArg {
    /// Transitive clustering via connected components
    Transitive,
    /// Legacy first-match grouping
    FirstMatch,
}

impl From<ClusterModeArg> for ClusterMode {
    fn from(arg: ClusterModeArg) -> Self {
        match arg {
            ClusterModeArg::Transitive => Self::Transitive,
            ClusterModeArg::FirstMatch => Self::FirstMatch,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report
    Text,
    /// Machine-readable JSON report
    Json,
}
