//! Scan configuration and startup validation.
//!
//! All knobs that influence a scan live in [`ScanConfig`]. Validation is
//! fail-fast: an invalid configuration is rejected before any document is
//! touched, and per-document processing never has to re-check it.

use serde::Serialize;
use thiserror::Error;

use crate::fingerprint::{PerceptualAlgorithm, VisualCode};
use crate::partition::ClusterMode;

/// Errors for invalid scan configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The near-duplicate threshold exceeds the code bit-width.
    #[error("Invalid near-duplicate threshold {0}: must be at most 64")]
    InvalidThreshold(u32),

    /// The worker count must be at least one.
    #[error("Invalid worker count {0}: must be at least 1")]
    InvalidWorkerCount(usize),
}

/// Configuration for a duplicate scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    /// Maximum Hamming distance for near-duplicate candidates. `None` uses
    /// the default tuned for the selected perceptual algorithm.
    pub near_duplicate_threshold: Option<u32>,
    /// Number of fingerprinting worker threads.
    pub worker_count: usize,
    /// Include per-document thumbnail references in the report. Consumed
    /// only by the report renderer; has zero effect on clustering.
    pub include_thumbnails: bool,
    /// Perceptual hashing algorithm for visual codes.
    pub algorithm: PerceptualAlgorithm,
    /// Near-duplicate clustering mode.
    pub cluster_mode: ClusterMode,
    /// Codable-record count that triggers the quadratic-cost warning.
    pub pairwise_warn_ceiling: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            near_duplicate_threshold: None,
            worker_count: 4,
            include_thumbnails: false,
            algorithm: PerceptualAlgorithm::default(),
            cluster_mode: ClusterMode::default(),
            pairwise_warn_ceiling: 5000,
        }
    }
}

impl ScanConfig {
    /// Set an explicit near-duplicate threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.near_duplicate_threshold = Some(threshold);
        self
    }

    /// Set the number of fingerprinting workers.
    #[must_use]
    pub fn with_worker_count(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Enable thumbnail references in the report.
    #[must_use]
    pub fn with_thumbnails(mut self, enabled: bool) -> Self {
        self.include_thumbnails = enabled;
        self
    }

    /// Set the perceptual algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: PerceptualAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the clustering mode.
    #[must_use]
    pub fn with_cluster_mode(mut self, mode: ClusterMode) -> Self {
        self.cluster_mode = mode;
        self
    }

    /// The threshold actually used: explicit value, or the algorithm default.
    #[must_use]
    pub fn effective_threshold(&self) -> u32 {
        self.near_duplicate_threshold
            .unwrap_or_else(|| self.algorithm.default_threshold())
    }

    /// Validate the configuration before any processing begins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an out-of-range threshold or a zero
    /// worker count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threshold) = self.near_duplicate_threshold {
            if threshold > VisualCode::BITS {
                return Err(ConfigError::InvalidThreshold(threshold));
            }
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = ScanConfig::default()
            .with_worker_count(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount(0)));
    }

    #[test]
    fn test_oversized_threshold_rejected() {
        let err = ScanConfig::default()
            .with_threshold(65)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(65)));
    }

    #[test]
    fn test_threshold_at_bit_width_allowed() {
        assert!(ScanConfig::default().with_threshold(64).validate().is_ok());
    }

    #[test]
    fn test_effective_threshold_falls_back_to_algorithm() {
        let config = ScanConfig::default().with_algorithm(PerceptualAlgorithm::Phash);
        assert_eq!(
            config.effective_threshold(),
            PerceptualAlgorithm::Phash.default_threshold()
        );
        assert_eq!(config.with_threshold(3).effective_threshold(), 3);
    }
}
