//! Duplicate partitioning: exact groups and near-duplicate clusters.
//!
//! # Overview
//!
//! This module consumes a [`ClosedIndex`] and produces the final duplicate
//! partition in two phases:
//!
//! 1. **Exact phase**: every exact bucket becomes one [`GroupKind::Exact`]
//!    group. Its non-representative members are *claimed* and excluded from
//!    further processing, so no document is ever reported as a duplicate
//!    twice. The representative stays eligible for near clustering and
//!    stands in for its whole exact family there.
//! 2. **Near phase**: the remaining codable records are compared pairwise.
//!    A pair within the Hamming threshold forms a candidate edge, and the
//!    connected components of the edge graph become [`GroupKind::Near`]
//!    groups. Components are transitive: a document near-duplicate of both
//!    A and B joins their cluster even when A and B themselves exceed the
//!    threshold.
//!
//! Both phases choose representatives deterministically (earliest mtime,
//! ties broken by lexicographic path), so output is reproducible across
//! runs and enumeration orders.
//!
//! # Complexity
//!
//! The near phase is O(n^2) in the number of unclaimed codable records.
//! Each comparison is a single XOR plus popcount, so batches in the
//! thousands are cheap; a warning is logged past a configurable ceiling.

pub mod union_find;

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::fingerprint::{DocumentRecord, VisualCode};
use crate::index::ClosedIndex;
use union_find::UnionFind;

/// How near-duplicate candidates are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMode {
    /// Full transitive clustering via connected components. A document close
    /// to any member joins the cluster.
    #[default]
    Transitive,
    /// Legacy mode: each document in path order is compared against
    /// already-recorded originals and joins the first one within threshold.
    /// Narrower than transitive clustering; kept for compatibility.
    FirstMatch,
}

/// Configuration for the partitioner.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Maximum Hamming distance for a near-duplicate candidate edge.
    pub threshold: u32,
    /// Clustering mode for the near phase.
    pub cluster_mode: ClusterMode,
    /// Codable-record count above which the quadratic pairwise cost is
    /// called out with a warning.
    pub pairwise_warn_ceiling: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            threshold: crate::fingerprint::PerceptualAlgorithm::default().default_threshold(),
            cluster_mode: ClusterMode::default(),
            pairwise_warn_ceiling: 5000,
        }
    }
}

/// Kind of duplicate relationship within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Byte-for-byte identical documents.
    Exact,
    /// Visually similar documents within the perceptual threshold.
    Near,
}

/// A non-representative member of a duplicate group.
#[derive(Debug, Clone)]
pub struct GroupMember {
    /// The member document
    pub record: DocumentRecord,
    /// Hamming distance to the representative (0 for exact duplicates)
    pub distance: u32,
    /// True when the member is only transitively connected: its reported
    /// distance is to its nearest in-cluster neighbor, not the representative
    pub transitive: bool,
}

/// A group of duplicate documents with a canonical representative.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// Whether this is an exact or near-duplicate group
    pub kind: GroupKind,
    /// The document chosen as the canonical original
    pub representative: DocumentRecord,
    /// All other documents in the group
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    /// Total documents in the group, representative included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len() + 1
    }

    /// A group always contains at least the representative.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Paths of all documents in the group, representative first.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.representative.path.clone())
            .chain(self.members.iter().map(|m| m.record.path.clone()))
            .collect()
    }
}

/// Statistics from a partition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Number of exact groups produced
    pub exact_groups: usize,
    /// Documents reported as exact duplicates (excluding representatives)
    pub exact_duplicates: usize,
    /// Number of near groups produced
    pub near_groups: usize,
    /// Documents reported as near duplicates (excluding representatives)
    pub near_duplicates: usize,
    /// Codable records that entered the near phase after claiming
    pub near_candidates: usize,
    /// Pairwise code comparisons performed
    pub comparisons: usize,
}

/// Partition a closed index into exact groups and near-duplicate clusters.
///
/// # Arguments
///
/// * `index` - The closed fingerprint index for the batch
/// * `config` - Threshold and clustering mode
///
/// # Returns
///
/// A tuple of:
/// - `Vec<DuplicateGroup>` - Exact groups ordered by representative path,
///   followed by near groups ordered by representative path
/// - `PartitionStats` - Statistics about the partition
#[must_use]
pub fn partition(
    index: &ClosedIndex,
    config: &PartitionConfig,
) -> (Vec<DuplicateGroup>, PartitionStats) {
    let mut stats = PartitionStats::default();

    let (mut groups, claimed) = exact_phase(index, &mut stats);

    let near = near_phase(index, &claimed, config, &mut stats);
    groups.extend(near);

    log::info!(
        "Partition complete: {} exact groups ({} duplicates), {} near groups ({} duplicates)",
        stats.exact_groups,
        stats.exact_duplicates,
        stats.near_groups,
        stats.near_duplicates
    );

    (groups, stats)
}

/// Build exact groups and the claimed set from the index buckets.
///
/// Only non-representative members are claimed; the representative stays
/// available to the near phase so an exact family can still be linked to a
/// visually similar document.
fn exact_phase(
    index: &ClosedIndex,
    stats: &mut PartitionStats,
) -> (Vec<DuplicateGroup>, HashSet<PathBuf>) {
    let mut groups = Vec::new();
    let mut claimed = HashSet::new();

    for members in index.exact_buckets().values() {
        let rep_idx = select_representative(members);
        let representative = members[rep_idx].clone();

        let group_members: Vec<GroupMember> = members
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != rep_idx)
            .map(|(_, record)| {
                claimed.insert(record.path.clone());
                GroupMember {
                    record: record.clone(),
                    distance: 0,
                    transitive: false,
                }
            })
            .collect();

        stats.exact_duplicates += group_members.len();
        groups.push(DuplicateGroup {
            kind: GroupKind::Exact,
            representative,
            members: group_members,
        });
    }

    groups.sort_by(|a, b| a.representative.path.cmp(&b.representative.path));
    stats.exact_groups = groups.len();

    log::debug!(
        "Exact phase: {} groups, {} documents claimed",
        stats.exact_groups,
        claimed.len()
    );

    (groups, claimed)
}

/// Cluster the unclaimed codable records into near-duplicate groups.
fn near_phase(
    index: &ClosedIndex,
    claimed: &HashSet<PathBuf>,
    config: &PartitionConfig,
    stats: &mut PartitionStats,
) -> Vec<DuplicateGroup> {
    // Exactness takes precedence: documents reported as exact duplicates
    // never re-enter. Exact representatives do, standing in for their family.
    let candidates: Vec<&DocumentRecord> = index
        .codable_records()
        .iter()
        .filter(|r| !claimed.contains(&r.path))
        .collect();
    stats.near_candidates = candidates.len();

    if candidates.len() > config.pairwise_warn_ceiling {
        log::warn!(
            "Near-duplicate clustering compares all pairs: {} documents means {} comparisons; \
             cost grows quadratically with batch size",
            candidates.len(),
            candidates.len() * candidates.len().saturating_sub(1) / 2
        );
    }

    let clusters = match config.cluster_mode {
        ClusterMode::Transitive => cluster_transitive(&candidates, config.threshold, stats),
        ClusterMode::FirstMatch => cluster_first_match(&candidates, config.threshold, stats),
    };

    let mut groups: Vec<DuplicateGroup> = clusters
        .into_iter()
        .map(|cluster| build_near_group(&candidates, &cluster, config.threshold))
        .collect();

    groups.sort_by(|a, b| a.representative.path.cmp(&b.representative.path));
    stats.near_groups = groups.len();
    stats.near_duplicates = groups.iter().map(|g| g.members.len()).sum();

    groups
}

/// Connected components of the candidate-edge graph; components of size 1
/// are dropped.
fn cluster_transitive(
    candidates: &[&DocumentRecord],
    threshold: u32,
    stats: &mut PartitionStats,
) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(candidates.len());

    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            stats.comparisons += 1;
            if code_distance(candidates[i], candidates[j]) <= threshold {
                uf.union(i, j);
            }
        }
    }

    let mut components: std::collections::BTreeMap<usize, Vec<usize>> =
        std::collections::BTreeMap::new();
    for i in 0..candidates.len() {
        components.entry(uf.find(i)).or_default().push(i);
    }

    components
        .into_values()
        .filter(|members| members.len() > 1)
        .collect()
}

/// Legacy clustering: each record joins the first already-recorded original
/// within threshold, in path order.
fn cluster_first_match(
    candidates: &[&DocumentRecord],
    threshold: u32,
    stats: &mut PartitionStats,
) -> Vec<Vec<usize>> {
    let mut originals: Vec<usize> = Vec::new();
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for i in 0..candidates.len() {
        let mut matched = false;
        for (slot, &orig) in originals.iter().enumerate() {
            stats.comparisons += 1;
            if code_distance(candidates[i], candidates[orig]) <= threshold {
                clusters[slot].push(i);
                matched = true;
                break;
            }
        }
        if !matched {
            originals.push(i);
            clusters.push(vec![i]);
        }
    }

    clusters.into_iter().filter(|c| c.len() > 1).collect()
}

/// Assemble one near group: pick the representative and annotate member
/// distances.
fn build_near_group(
    candidates: &[&DocumentRecord],
    cluster: &[usize],
    threshold: u32,
) -> DuplicateGroup {
    let records: Vec<&DocumentRecord> = cluster.iter().map(|&i| candidates[i]).collect();
    let rep_pos = select_representative_refs(&records);
    let representative = records[rep_pos].clone();

    let members = records
        .iter()
        .enumerate()
        .filter(|(pos, _)| *pos != rep_pos)
        .map(|(pos, record)| {
            let to_rep = code_distance(record, &representative);
            if to_rep <= threshold {
                GroupMember {
                    record: (*record).clone(),
                    distance: to_rep,
                    transitive: false,
                }
            } else {
                // Only transitively connected: report the distance to the
                // nearest in-cluster neighbor instead.
                let nearest = records
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != pos)
                    .map(|(_, other)| code_distance(record, other))
                    .min()
                    .unwrap_or(to_rep);
                GroupMember {
                    record: (*record).clone(),
                    distance: nearest,
                    transitive: true,
                }
            }
        })
        .collect();

    DuplicateGroup {
        kind: GroupKind::Near,
        representative,
        members,
    }
}

fn code_distance(a: &DocumentRecord, b: &DocumentRecord) -> u32 {
    match (a.visual_code, b.visual_code) {
        (Some(ca), Some(cb)) => ca.distance(&cb),
        // Records without codes never reach the near phase.
        _ => VisualCode::BITS,
    }
}

/// Deterministic representative selection: earliest mtime, ties broken by
/// lexicographically smallest path.
fn select_representative(records: &[DocumentRecord]) -> usize {
    records
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.mtime.cmp(&b.mtime).then_with(|| a.path.cmp(&b.path)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn select_representative_refs(records: &[&DocumentRecord]) -> usize {
    records
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.mtime.cmp(&b.mtime).then_with(|| a.path.cmp(&b.path)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
