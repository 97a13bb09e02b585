//! Content fingerprinting for scanned documents.
//!
//! This module computes the two fingerprints that drive duplicate detection:
//! - [`Digest`]: a 32-byte BLAKE3 hash of the full file content, used for
//!   exact-duplicate detection.
//! - [`VisualCode`]: a 64-bit perceptual code derived from a rendering of the
//!   first page, used for near-duplicate detection.
//!
//! # Architecture
//!
//! - [`digest`]: streaming BLAKE3 content digests
//! - [`perceptual`]: perceptual codes from rendered page bitmaps
//!
//! # Example
//!
//! ```no_run
//! use scandupe::fingerprint::Fingerprinter;
//! use std::path::Path;
//!
//! let fingerprinter = Fingerprinter::default();
//! // No bitmap: the record is still eligible for exact-duplicate detection.
//! let record = fingerprinter.fingerprint(Path::new("scan-001.pdf"), None).unwrap();
//! assert!(record.visual_code.is_none());
//! ```

pub mod digest;
pub mod perceptual;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::GrayImage;
use serde::Serialize;

pub use digest::{digest_bytes, digest_file, digest_to_hex};
pub use perceptual::{PerceptualAlgorithm, PerceptualHasher};

/// 32-byte BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Fixed-width perceptual code for a rendered first page.
///
/// Similarity between two codes is measured by Hamming distance: the
/// popcount of their XOR. Visually similar pages produce codes within a
/// small distance; unrelated pages differ in roughly half their bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VisualCode(pub u64);

impl VisualCode {
    /// Number of bits in a code. Hamming distances range from 0 to this.
    pub const BITS: u32 = 64;

    /// Hamming distance to another code.
    #[must_use]
    pub fn distance(&self, other: &VisualCode) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

/// A fully fingerprinted document.
///
/// Created once by the [`Fingerprinter`] and immutable thereafter; records
/// live only for the duration of a batch.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// Absolute path to the document
    pub path: PathBuf,
    /// BLAKE3 digest of the full file content
    pub byte_digest: Digest,
    /// Perceptual code of the rendered first page, `None` if rendering failed
    pub visual_code: Option<VisualCode>,
    /// File size in bytes (deterministic tie-breaker only)
    pub size_bytes: u64,
    /// Last modification time (deterministic tie-breaker only)
    pub mtime: SystemTime,
}

/// Errors that can occur while reading a document for fingerprinting.
///
/// Any of these excludes the document from the batch entirely; a document
/// whose bytes cannot be read is never hashed as empty.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The document was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the document.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the document.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Computes [`DocumentRecord`]s from document bytes and rendered pages.
///
/// Stateless apart from the configured perceptual algorithm; safe to share
/// across worker threads behind an `Arc`.
pub struct Fingerprinter {
    perceptual: PerceptualHasher,
}

impl Fingerprinter {
    /// Create a fingerprinter using the given perceptual algorithm.
    #[must_use]
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        Self {
            perceptual: PerceptualHasher::new(algorithm),
        }
    }

    /// Fingerprint a single document.
    ///
    /// The digest is always computed from the file bytes. The visual code is
    /// populated only when a rendered first-page bitmap is supplied; callers
    /// pass `None` when rendering failed, and the document then participates
    /// in exact-duplicate detection only.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] if the file bytes or metadata cannot be
    /// read. The document must then be excluded from the batch.
    pub fn fingerprint(
        &self,
        path: &Path,
        bitmap: Option<&GrayImage>,
    ) -> Result<DocumentRecord, FingerprintError> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FingerprintError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => {
                FingerprintError::PermissionDenied(path.to_path_buf())
            }
            _ => FingerprintError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let byte_digest = digest_file(path)?;
        let visual_code = bitmap.map(|b| self.perceptual.code_bitmap(b));

        Ok(DocumentRecord {
            path: path.to_path_buf(),
            byte_digest,
            visual_code,
            size_bytes: metadata.len(),
            mtime,
        })
    }

    /// Get the perceptual algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.perceptual.algorithm()
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::tempdir;

    #[test]
    fn test_visual_code_distance() {
        let a = VisualCode(0b1010);
        let b = VisualCode(0b0110);
        assert_eq!(a.distance(&b), 2);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(VisualCode(0).distance(&VisualCode(u64::MAX)), 64);
    }

    #[test]
    fn test_fingerprint_without_bitmap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"content").unwrap();

        let record = Fingerprinter::default().fingerprint(&path, None).unwrap();
        assert_eq!(record.path, path);
        assert_eq!(record.size_bytes, 7);
        assert!(record.visual_code.is_none());
        assert_eq!(record.byte_digest, digest_bytes(b"content"));
    }

    #[test]
    fn test_fingerprint_with_bitmap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"content").unwrap();

        let bitmap = GrayImage::from_pixel(64, 64, Luma([128]));
        let record = Fingerprinter::default()
            .fingerprint(&path, Some(&bitmap))
            .unwrap();
        assert!(record.visual_code.is_some());
    }

    #[test]
    fn test_fingerprint_missing_document() {
        let err = Fingerprinter::default()
            .fingerprint(Path::new("/no/such/doc.pdf"), None)
            .unwrap_err();
        assert!(matches!(err, FingerprintError::NotFound(_)));
    }
}
