use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scandupe::fingerprint::{digest_bytes, DocumentRecord, VisualCode};
use scandupe::index::FingerprintIndex;
use scandupe::partition::{partition, PartitionConfig};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

// Helper to build a synthetic fingerprint batch: a mix of exact duplicates,
// near-duplicate clusters, and unique documents.
fn build_index(count: usize) -> scandupe::index::ClosedIndex {
    let index = FingerprintIndex::new();
    for i in 0..count {
        // Every tenth pair is byte-identical; codes drift slowly so nearby
        // documents cluster.
        let digest_seed = if i % 10 == 0 { i / 2 } else { i };
        let code = (i as u64 / 3) << 8 | (i as u64 % 3);
        index.insert(DocumentRecord {
            path: PathBuf::from(format!("/scans/doc-{i:05}.pdf")),
            byte_digest: digest_bytes(&digest_seed.to_le_bytes()),
            visual_code: Some(VisualCode(code)),
            size_bytes: 4096,
            mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(i as u64),
        });
    }
    index.close()
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size_kb in [1usize, 256, 1024] {
        let content = vec![0xA5u8; size_kb * 1024];
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size_kb}kb")),
            &content,
            |b, content| b.iter(|| black_box(digest_bytes(content))),
        );
    }
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    for count in [100usize, 1000, 2000] {
        let closed = build_index(count);
        let config = PartitionConfig::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &closed,
            |b, closed| b.iter(|| black_box(partition(closed, &config))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_digest, bench_partition);
criterion_main!(benches);
