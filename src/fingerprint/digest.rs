//! BLAKE3 content digests with streaming support.
//!
//! # Overview
//!
//! This module computes the exact-identity digest of a document: a 32-byte
//! BLAKE3 hash over the raw byte stream. Identical bytes always produce an
//! identical digest; any byte difference produces a different digest with
//! overwhelming probability.
//!
//! Hashing is a stateless pure function of the file content. A document
//! whose bytes cannot be read is never hashed as empty; the error is
//! returned so the caller can exclude the document from the batch.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{Digest, FingerprintError};

/// Read buffer size for streaming digests.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the BLAKE3 digest of a file's full content.
///
/// Streams the file in fixed-size chunks so memory usage stays constant
/// regardless of document size.
///
/// # Errors
///
/// Returns [`FingerprintError`] if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> Result<Digest, FingerprintError> {
    let mut file = File::open(path).map_err(|e| map_io_error(path, e))?;

    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| map_io_error(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(*hasher.finalize().as_bytes())
}

/// Compute the BLAKE3 digest of an in-memory byte slice.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> Digest {
    *blake3::hash(bytes).as_bytes()
}

/// Convert a digest to its lowercase hexadecimal representation.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn map_io_error(path: &Path, e: io::Error) -> FingerprintError {
    match e.kind() {
        io::ErrorKind::NotFound => FingerprintError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => {
            FingerprintError::PermissionDenied(path.to_path_buf())
        }
        _ => FingerprintError::Io {
            path: PathBuf::from(path),
            source: e,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_identical_bytes_identical_digest() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"scanned document content").unwrap();
        std::fs::write(&b, b"scanned document content").unwrap();

        assert_eq!(digest_file(&a).unwrap(), digest_file(&b).unwrap());
    }

    #[test]
    fn test_different_bytes_different_digest() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"scanned document content").unwrap();
        std::fs::write(&b, b"scanned document content!").unwrap();

        assert_ne!(digest_file(&a).unwrap(), digest_file(&b).unwrap());
    }

    #[test]
    fn test_streaming_matches_in_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&content).unwrap();
        drop(file);

        assert_eq!(digest_file(&path).unwrap(), digest_bytes(&content));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = digest_file(Path::new("/no/such/document.pdf")).unwrap_err();
        assert!(matches!(err, FingerprintError::NotFound(_)));
    }

    #[test]
    fn test_digest_to_hex() {
        let mut digest = [0u8; 32];
        digest[0] = 0xab;
        digest[31] = 0x0f;
        let hex = digest_to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("0f"));
    }
}
