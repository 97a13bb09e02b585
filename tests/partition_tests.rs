use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use scandupe::fingerprint::{DocumentRecord, VisualCode};
use scandupe::index::FingerprintIndex;
use scandupe::partition::{partition, ClusterMode, GroupKind, PartitionConfig};

fn record(path: &str, digest_tag: u8, code: Option<u64>, mtime_secs: u64) -> DocumentRecord {
    DocumentRecord {
        path: PathBuf::from(path),
        byte_digest: [digest_tag; 32],
        visual_code: code.map(VisualCode),
        size_bytes: 1024,
        mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs),
    }
}

fn config(threshold: u32) -> PartitionConfig {
    PartitionConfig {
        threshold,
        ..Default::default()
    }
}

fn run(records: Vec<DocumentRecord>, config: &PartitionConfig) -> Vec<(GroupKind, Vec<PathBuf>)> {
    let index = FingerprintIndex::new();
    for r in records {
        index.insert(r);
    }
    let (groups, _) = partition(&index.close(), config);
    groups.into_iter().map(|g| (g.kind, g.paths())).collect()
}

#[test]
fn test_exact_and_near_groups_combined() {
    // Two byte-identical scans, plus a third visually close to them and a
    // fourth that is unrelated.
    let records = vec![
        record("/scans/a.pdf", 1, Some(0b1111), 100),
        record("/scans/b.pdf", 1, Some(0b1111), 200),
        record("/scans/c.pdf", 2, Some(0b1110), 300),
        record("/scans/far.pdf", 3, Some(u64::MAX), 400),
    ];

    let groups = run(records, &config(5));
    assert_eq!(groups.len(), 2);

    // Exact groups come first, ordered by representative path.
    assert_eq!(groups[0].0, GroupKind::Exact);
    assert_eq!(
        groups[0].1,
        vec![PathBuf::from("/scans/a.pdf"), PathBuf::from("/scans/b.pdf")]
    );

    // The exact representative carries its family into near clustering.
    assert_eq!(groups[1].0, GroupKind::Near);
    assert_eq!(
        groups[1].1,
        vec![PathBuf::from("/scans/a.pdf"), PathBuf::from("/scans/c.pdf")]
    );
}

#[test]
fn test_representative_is_earliest_mtime() {
    let records = vec![
        record("/scans/newer.pdf", 7, None, 500),
        record("/scans/older.pdf", 7, None, 100),
    ];

    let groups = run(records, &config(5));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].1[0], PathBuf::from("/scans/older.pdf"));
}

#[test]
fn test_insertion_order_does_not_change_output() {
    let records = vec![
        record("/scans/a.pdf", 1, Some(10), 10),
        record("/scans/b.pdf", 1, Some(10), 20),
        record("/scans/c.pdf", 2, Some(11), 30),
        record("/scans/d.pdf", 3, Some(8), 40),
        record("/scans/e.pdf", 4, Some(u64::MAX), 50),
    ];

    let cfg = config(5);
    let forward = run(records.clone(), &cfg);
    let mut reversed = records;
    reversed.reverse();
    let backward = run(reversed, &cfg);

    assert_eq!(forward, backward);
}

#[test]
fn test_first_match_is_never_wider_than_transitive() {
    // A chain: a-b at distance 3, b-c at distance 3, a-c at distance 6.
    let records = vec![
        record("/scans/a.pdf", 1, Some(0b000000), 10),
        record("/scans/b.pdf", 2, Some(0b000111), 20),
        record("/scans/c.pdf", 3, Some(0b111111), 30),
    ];

    let transitive = run(records.clone(), &config(4));
    assert_eq!(transitive.len(), 1);
    assert_eq!(transitive[0].1.len(), 3);

    let first_match = run(
        records,
        &PartitionConfig {
            threshold: 4,
            cluster_mode: ClusterMode::FirstMatch,
            ..Default::default()
        },
    );
    // c is beyond the threshold from the recorded original a, so it is not
    // pulled into the group.
    assert_eq!(first_match.len(), 1);
    assert_eq!(
        first_match[0].1,
        vec![PathBuf::from("/scans/a.pdf"), PathBuf::from("/scans/b.pdf")]
    );
}

#[test]
fn test_threshold_zero_requires_identical_codes() {
    let records = vec![
        record("/scans/a.pdf", 1, Some(42), 10),
        record("/scans/b.pdf", 2, Some(42), 20),
        record("/scans/c.pdf", 3, Some(43), 30),
    ];

    let groups = run(records, &config(0));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, GroupKind::Near);
    assert_eq!(
        groups[0].1,
        vec![PathBuf::from("/scans/a.pdf"), PathBuf::from("/scans/b.pdf")]
    );
}

#[test]
fn test_documents_without_codes_only_match_exactly() {
    let records = vec![
        record("/scans/rendered.pdf", 1, Some(0), 10),
        record("/scans/unrendered.pdf", 2, None, 20),
    ];

    let groups = run(records, &config(64));
    assert!(groups.is_empty());
}

#[test]
fn test_no_document_reported_as_duplicate_twice() {
    let records = vec![
        record("/scans/a1.pdf", 1, Some(0), 10),
        record("/scans/a2.pdf", 1, Some(0), 20),
        record("/scans/b1.pdf", 2, Some(1), 30),
        record("/scans/b2.pdf", 2, Some(1), 40),
        record("/scans/c.pdf", 3, Some(2), 50),
    ];

    let index = FingerprintIndex::new();
    for r in records {
        index.insert(r);
    }
    let (groups, _) = partition(&index.close(), &config(5));

    // An exact representative stands in for its whole family in the near
    // phase, so it may front an exact group and also appear in a near
    // cluster. Every other document is reported at most once.
    let mut seen = std::collections::HashSet::new();
    for group in &groups {
        for member in &group.members {
            assert!(
                seen.insert(member.record.path.clone()),
                "{} reported as duplicate twice",
                member.record.path.display()
            );
        }
    }
}
