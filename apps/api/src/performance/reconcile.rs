use std::collections::HashSet;

use crate::models::analysis::AnalysisHistoryEntry;
use crate::models::performance::{MatchedPerformanceRecord, PerformanceRecord};

/// Result of merging a parsed report into a client's stored rows.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Rows that survived dedup, in input order.
    pub added: Vec<PerformanceRecord>,
    pub duplicates: usize,
}

/// Row-level dedup on the composite key. First write wins: a row whose key
/// already exists (in the store or earlier in the same report) is counted
/// and discarded even when its other fields differ.
pub fn merge_rows(existing: &[PerformanceRecord], parsed: Vec<PerformanceRecord>) -> MergeOutcome {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.unique_id.clone()).collect();
    let mut added = Vec::new();
    let mut duplicates = 0;

    for row in parsed {
        if seen.contains(&row.unique_id) {
            duplicates += 1;
        } else {
            seen.insert(row.unique_id.clone());
            added.push(row);
        }
    }

    MergeOutcome { added, duplicates }
}

/// Removes every row carried in by the given report file. Together with
/// unregistering the file hash this restores the pre-upload state exactly.
/// There is no multi-step undo.
pub fn undo_last_upload(rows: Vec<PerformanceRecord>, file_hash: &str) -> Vec<PerformanceRecord> {
    rows.into_iter().filter(|r| r.file_hash != file_hash).collect()
}

/// Heuristic filename join, not a foreign key: the first history entry (in
/// insertion order) of the same client whose filename is a substring of
/// the row's creative identifier wins. Several rows may match one entry; a
/// row may match none. One filename being an accidental substring of
/// another produces a false positive; callers treat the match as a hint,
/// not ground truth.
pub fn find_history_match<'a>(
    record: &PerformanceRecord,
    history: &'a [AnalysisHistoryEntry],
) -> Option<&'a AnalysisHistoryEntry> {
    history
        .iter()
        .find(|h| h.client_id == record.client_id && record.creative_name.contains(&h.filename))
}

/// Annotates every row with its match outcome. Recomputed on each view,
/// never persisted.
pub fn reconcile(
    rows: &[PerformanceRecord],
    history: &[AnalysisHistoryEntry],
) -> Vec<MatchedPerformanceRecord> {
    rows.iter()
        .map(|record| {
            let matched = find_history_match(record, history);
            MatchedPerformanceRecord {
                record: record.clone(),
                is_matched: matched.is_some(),
                creative_description: matched.map(|h| h.description.clone()),
            }
        })
        .collect()
}
