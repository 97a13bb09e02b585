//! First-page rasterization boundary.
//!
//! The clustering engine never renders documents itself; it consumes
//! grayscale first-page bitmaps through the [`PageRasterizer`] trait. A
//! render failure is a partial-capability condition, not a hard error: the
//! document keeps its content digest and participates in exact-duplicate
//! detection, it is only excluded from near-duplicate clustering.
//!
//! [`ImageFileRasterizer`] handles scans stored directly as raster images
//! (TIFF, PNG, BMP, GIF, WebP). PDF back-ends plug in behind the same trait.

use std::path::{Path, PathBuf};

use image::GrayImage;
use thiserror::Error;

/// Errors that can occur while rasterizing a document's first page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document could not be read at all.
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        /// Path to the document
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is encrypted and cannot be rendered.
    #[error("Document is encrypted: {0}")]
    Encrypted(PathBuf),

    /// The document has no pages to render.
    #[error("Document has no pages: {0}")]
    ZeroPages(PathBuf),

    /// The document bytes could not be decoded into a page image.
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// Path to the document
        path: PathBuf,
        /// Decoder error message
        message: String,
    },
}

/// Supplies a grayscale bitmap of a document's first page.
///
/// Implementations must be shareable across the fingerprinting worker pool.
pub trait PageRasterizer: Send + Sync {
    /// Render the first page of the document at `path` as a grayscale bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the document cannot be rendered. Callers
    /// treat this as a recoverable, per-document condition.
    fn rasterize_first_page(&self, path: &Path) -> Result<GrayImage, RenderError>;
}

/// Rasterizer for documents stored as plain raster images.
///
/// Scanned pages are frequently archived as single-page TIFF or PNG files;
/// for those the "first page" is the image itself, converted to grayscale.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFileRasterizer;

impl PageRasterizer for ImageFileRasterizer {
    fn rasterize_first_page(&self, path: &Path) -> Result<GrayImage, RenderError> {
        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => RenderError::Unreadable {
                path: path.to_path_buf(),
                source,
            },
            other => RenderError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        Ok(img.to_luma8())
    }
}
