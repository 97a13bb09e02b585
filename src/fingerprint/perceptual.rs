//! Perceptual fingerprinting of rendered document pages.
//!
//! This module turns a grayscale bitmap of a document's first page into a
//! fixed 64-bit [`VisualCode`]. Codes are designed so that visually similar
//! pages land within a small Hamming distance of each other, while unrelated
//! pages differ in roughly half their bits.

use image::{DynamicImage, GrayImage};
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};

use super::VisualCode;

/// Supported perceptual hashing algorithms.
///
/// All variants produce a 64-bit code from an 8x8 grid, so codes from the
/// same algorithm are directly comparable by Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualAlgorithm {
    /// dHash (Difference Hash) - gradient-based, fast and effective for
    /// scanned pages.
    #[default]
    Dhash,
    /// aHash (Average Hash) - mean-based, fast but less resilient.
    Ahash,
    /// pHash (Perceptual Hash) - DCT-based, most resilient to recompression.
    Phash,
}

impl PerceptualAlgorithm {
    /// Default near-duplicate threshold (Hamming distance) for this algorithm.
    ///
    /// Smaller is stricter. Values were tuned on re-scanned document sets.
    #[must_use]
    pub fn default_threshold(&self) -> u32 {
        match self {
            Self::Dhash => 5,
            Self::Ahash => 5,
            Self::Phash => 10,
        }
    }
}

impl std::fmt::Display for PerceptualAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dhash => write!(f, "dHash"),
            Self::Ahash => write!(f, "aHash"),
            Self::Phash => write!(f, "pHash"),
        }
    }
}

/// Computes 64-bit perceptual codes for rendered pages.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    algorithm: PerceptualAlgorithm,
}

impl PerceptualHasher {
    /// Create a new `PerceptualHasher` with the given algorithm.
    #[must_use]
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        // 8x8 grid in every mode so the packed code is always 64 bits.
        let mut config = HasherConfig::new().hash_size(8, 8);

        match algorithm {
            PerceptualAlgorithm::Dhash => {
                config = config.hash_alg(HashAlg::Gradient);
            }
            PerceptualAlgorithm::Ahash => {
                config = config.hash_alg(HashAlg::Mean);
            }
            PerceptualAlgorithm::Phash => {
                config = config.hash_alg(HashAlg::Median).preproc_dct();
            }
        }

        Self {
            hasher: config.to_hasher(),
            algorithm,
        }
    }

    /// Compute the visual code for a rendered first-page bitmap.
    ///
    /// Pure function of the bitmap contents; the same bitmap always yields
    /// the same code.
    #[must_use]
    pub fn code_bitmap(&self, bitmap: &GrayImage) -> VisualCode {
        let img = DynamicImage::ImageLuma8(bitmap.clone());
        let hash = self.hasher.hash_image(&img);

        // 8x8 grid fixed at construction, so the hash is always 8 bytes.
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&hash.as_bytes()[..8]);
        VisualCode(u64::from_be_bytes(raw))
    }

    /// Get the algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.algorithm
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::Dhash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// A page-like image: smooth horizontal gradient, as produced by an
    /// evenly lit scan.
    fn gradient_page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            Luma([(x * 255 / width.max(1)) as u8])
        })
    }

    /// A structurally unrelated page: checkerboard blocks.
    fn checkerboard_page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x / 16 + y / 16) % 2 == 0 {
                Luma([235])
            } else {
                Luma([20])
            }
        })
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(PerceptualAlgorithm::Dhash.to_string(), "dHash");
        assert_eq!(PerceptualAlgorithm::Ahash.to_string(), "aHash");
        assert_eq!(PerceptualAlgorithm::Phash.to_string(), "pHash");
    }

    #[test]
    fn test_same_bitmap_same_code() {
        let hasher = PerceptualHasher::default();
        let page = gradient_page(256, 256);
        assert_eq!(hasher.code_bitmap(&page), hasher.code_bitmap(&page));
    }

    #[test]
    fn test_rescan_yields_small_distance() {
        let hasher = PerceptualHasher::default();
        let original = gradient_page(256, 256);

        // Simulate a re-scan: uniform brightness shift.
        let rescan = GrayImage::from_fn(256, 256, |x, y| {
            let p = original.get_pixel(x, y)[0];
            Luma([p.saturating_add(12)])
        });

        let d = hasher
            .code_bitmap(&original)
            .distance(&hasher.code_bitmap(&rescan));
        assert!(d <= 5, "re-scan distance {d} too large");
    }

    #[test]
    fn test_unrelated_pages_yield_large_distance() {
        let hasher = PerceptualHasher::default();
        let a = gradient_page(256, 256);
        let b = checkerboard_page(256, 256);

        let d = hasher.code_bitmap(&a).distance(&hasher.code_bitmap(&b));
        assert!(d > 10, "unrelated pages too close: distance {d}");
    }

    #[test]
    fn test_resolution_independence() {
        // The same page scanned at different DPIs should still match closely.
        let hasher = PerceptualHasher::default();
        let low = gradient_page(128, 128);
        let high = gradient_page(512, 512);

        let d = hasher.code_bitmap(&low).distance(&hasher.code_bitmap(&high));
        assert!(d <= 5, "resolution change distance {d} too large");
    }
}
