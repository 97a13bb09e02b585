//! Fingerprint accumulation for a scan batch.
//!
//! # Overview
//!
//! [`FingerprintIndex`] collects [`DocumentRecord`]s as fingerprinting
//! workers complete, in whatever order they finish. Once the batch is done
//! the index is closed, producing a [`ClosedIndex`] with fully deterministic
//! views:
//!
//! - exact-duplicate buckets keyed by content digest, restricted to digests
//!   with two or more members
//! - the path-ordered sequence of records carrying a visual code, which is
//!   the input to near-duplicate clustering
//!
//! The index is append-only for the duration of a batch: records are never
//! mutated after insertion, and the whole structure is discarded once the
//! partition has been produced. Insertion is safe under concurrent writers;
//! everything after `close()` is single-threaded and lock-free.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::fingerprint::{digest_to_hex, Digest, DocumentRecord};

/// Thread-safe accumulator of document fingerprints.
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    records: Mutex<Vec<DocumentRecord>>,
}

impl FingerprintIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a completed record.
    ///
    /// Only fully populated records may be inserted; callers must never
    /// insert partial records for abandoned or failed documents.
    pub fn insert(&self, record: DocumentRecord) {
        self.records
            .lock()
            .expect("fingerprint index lock poisoned")
            .push(record);
    }

    /// Number of records inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .expect("fingerprint index lock poisoned")
            .len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the batch and produce deterministic views.
    ///
    /// Records are sorted by path, so the resulting views are identical
    /// regardless of worker completion order.
    #[must_use]
    pub fn close(self) -> ClosedIndex {
        let mut records = self
            .records
            .into_inner()
            .expect("fingerprint index lock poisoned");
        records.sort_by(|a, b| a.path.cmp(&b.path));

        let total_records = records.len();

        let mut buckets: BTreeMap<Digest, Vec<DocumentRecord>> = BTreeMap::new();
        let mut codable = Vec::new();
        for record in records {
            if record.visual_code.is_some() {
                codable.push(record.clone());
            }
            buckets.entry(record.byte_digest).or_default().push(record);
        }

        // Singleton digests carry no duplication signal; drop them here so
        // the partitioner only ever sees real exact buckets.
        let mut singletons = 0usize;
        buckets.retain(|digest, members| {
            if members.len() > 1 {
                log::debug!(
                    "Exact bucket {}: {} members",
                    digest_to_hex(digest),
                    members.len()
                );
                true
            } else {
                singletons += 1;
                false
            }
        });

        log::info!(
            "Index closed: {} records, {} exact buckets, {} singletons, {} codable",
            total_records,
            buckets.len(),
            singletons,
            codable.len()
        );

        ClosedIndex {
            total_records,
            buckets,
            codable,
        }
    }
}

/// Immutable, deterministic view of a closed batch.
#[derive(Debug)]
pub struct ClosedIndex {
    total_records: usize,
    buckets: BTreeMap<Digest, Vec<DocumentRecord>>,
    codable: Vec<DocumentRecord>,
}

impl ClosedIndex {
    /// Total records that were inserted into the batch.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Exact-duplicate buckets: digest to path-ordered members, digests with
    /// two or more members only, iterated in digest order.
    #[must_use]
    pub fn exact_buckets(&self) -> &BTreeMap<Digest, Vec<DocumentRecord>> {
        &self.buckets
    }

    /// All records with a present visual code, in path order regardless of
    /// arrival order.
    #[must_use]
    pub fn codable_records(&self) -> &[DocumentRecord] {
        &self.codable
    }
}
