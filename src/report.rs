//! Report rendering for scan outcomes.
//!
//! The renderer consumes the ordered duplicate groups, the per-document
//! failure list, and the summary counts, and nothing else. Nothing
//! here feeds back into clustering; `include_thumbnails` only controls
//! whether members carry a thumbnail source reference for downstream
//! viewers.

use std::io::{self, Write};

use serde::Serialize;

use crate::fingerprint::digest_to_hex;
use crate::partition::{DuplicateGroup, GroupKind};
use crate::pipeline::{ScanFailure, ScanOutcome};

/// One document inside a rendered group.
#[derive(Debug, Serialize)]
struct ReportDocument {
    path: String,
    size_bytes: u64,
    /// Hamming distance to the representative (0 for exact duplicates)
    distance: u32,
    /// Present when the member is only transitively connected
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    transitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_source: Option<String>,
}

/// One rendered duplicate group.
#[derive(Debug, Serialize)]
struct ReportGroup {
    kind: GroupKind,
    digest: String,
    representative: String,
    members: Vec<ReportDocument>,
}

/// The complete machine-readable report.
#[derive(Debug, Serialize)]
struct Report<'a> {
    groups: Vec<ReportGroup>,
    failures: &'a [ScanFailure],
    summary: &'a crate::pipeline::ScanSummary,
}

fn build_group(group: &DuplicateGroup, include_thumbnails: bool) -> ReportGroup {
    let members = group
        .members
        .iter()
        .map(|m| ReportDocument {
            path: m.record.path.display().to_string(),
            size_bytes: m.record.size_bytes,
            distance: m.distance,
            transitive: m.transitive,
            thumbnail_source: include_thumbnails
                .then(|| m.record.path.display().to_string()),
        })
        .collect();

    ReportGroup {
        kind: group.kind,
        digest: digest_to_hex(&group.representative.byte_digest),
        representative: group.representative.path.display().to_string(),
        members,
    }
}

/// Render the outcome as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_json(
    outcome: &ScanOutcome,
    include_thumbnails: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let report = Report {
        groups: outcome
            .groups
            .iter()
            .map(|g| build_group(g, include_thumbnails))
            .collect(),
        failures: &outcome.failures,
        summary: &outcome.summary,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

/// Render the outcome as a human-readable text report.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_text(outcome: &ScanOutcome, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Duplicate document report")?;
    writeln!(out, "=========================")?;
    writeln!(
        out,
        "{} documents scanned, {} exact groups, {} near groups, {} failures",
        outcome.summary.total_documents,
        outcome.summary.exact_groups,
        outcome.summary.near_groups,
        outcome.failures.len()
    )?;

    for group in &outcome.groups {
        writeln!(out)?;
        match group.kind {
            GroupKind::Exact => writeln!(
                out,
                "Exact group ({} copies) - original: {}",
                group.len(),
                group.representative.path.display()
            )?,
            GroupKind::Near => writeln!(
                out,
                "Near group ({} documents) - original: {}",
                group.len(),
                group.representative.path.display()
            )?,
        }
        for member in &group.members {
            if group.kind == GroupKind::Exact {
                writeln!(out, "  duplicate: {}", member.record.path.display())?;
            } else if member.transitive {
                writeln!(
                    out,
                    "  similar:   {} (distance {} via nearest neighbor)",
                    member.record.path.display(),
                    member.distance
                )?;
            } else {
                writeln!(
                    out,
                    "  similar:   {} (distance {})",
                    member.record.path.display(),
                    member.distance
                )?;
            }
        }
    }

    if !outcome.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "Failures")?;
        writeln!(out, "--------")?;
        for failure in &outcome.failures {
            writeln!(
                out,
                "  {:?} {}: {}",
                failure.kind,
                failure.path.display(),
                failure.message
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{DocumentRecord, VisualCode};
    use crate::partition::GroupMember;
    use crate::pipeline::{FailureKind, ScanSummary};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn outcome() -> ScanOutcome {
        let rep = DocumentRecord {
            path: PathBuf::from("/scans/a.pdf"),
            byte_digest: [1u8; 32],
            visual_code: Some(VisualCode(5)),
            size_bytes: 100,
            mtime: SystemTime::UNIX_EPOCH,
        };
        let dup = DocumentRecord {
            path: PathBuf::from("/scans/b.pdf"),
            byte_digest: [1u8; 32],
            visual_code: Some(VisualCode(5)),
            size_bytes: 100,
            mtime: SystemTime::UNIX_EPOCH,
        };
        ScanOutcome {
            groups: vec![DuplicateGroup {
                kind: GroupKind::Exact,
                representative: rep,
                members: vec![GroupMember {
                    record: dup,
                    distance: 0,
                    transitive: false,
                }],
            }],
            failures: vec![ScanFailure {
                path: PathBuf::from("/scans/locked.pdf"),
                kind: FailureKind::Render,
                message: "encrypted".into(),
            }],
            summary: ScanSummary {
                total_documents: 3,
                fingerprinted: 3,
                exact_groups: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_text_report_lists_groups_and_failures() {
        let mut buf = Vec::new();
        render_text(&outcome(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Exact group (2 copies)"));
        assert!(text.contains("original: /scans/a.pdf"));
        assert!(text.contains("duplicate: /scans/b.pdf"));
        assert!(text.contains("/scans/locked.pdf"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let mut buf = Vec::new();
        render_json(&outcome(), false, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["groups"][0]["kind"], "exact");
        assert_eq!(value["groups"][0]["representative"], "/scans/a.pdf");
        assert_eq!(value["failures"][0]["kind"], "render");
        assert!(value["groups"][0]["members"][0]
            .get("thumbnail_source")
            .is_none());
    }

    #[test]
    fn test_json_thumbnails_flag_adds_references_only() {
        let mut with = Vec::new();
        let mut without = Vec::new();
        render_json(&outcome(), true, &mut with).unwrap();
        render_json(&outcome(), false, &mut without).unwrap();

        let with: serde_json::Value = serde_json::from_slice(&with).unwrap();
        assert_eq!(
            with["groups"][0]["members"][0]["thumbnail_source"],
            "/scans/b.pdf"
        );
        // Same groups either way; the flag never influences clustering.
        let without: serde_json::Value = serde_json::from_slice(&without).unwrap();
        assert_eq!(
            with["groups"][0]["representative"],
            without["groups"][0]["representative"]
        );
    }
}
