//! Collapse repeated merges of the same branch to the most recent one.

use std::collections::HashSet;

use tracing::debug;

use crate::models::MergeRecord;

/// Keep the first record seen for each merged branch.
///
/// Input is newest first, so the survivor is the most recent merge of that
/// branch. Survivors keep their first-encountered order (newest branch
/// first); reverse the result to apply merges chronologically.
pub fn simplify<I>(records: I) -> Vec<MergeRecord>
where
    I: IntoIterator<Item = MergeRecord>,
{
    let mut seen = HashSet::new();
    let mut simplified = Vec::new();

    for record in records {
        if seen.insert(record.merge_branch.clone()) {
            debug!(branch = %record.merge_branch, rev = %record.commit.revision, "keeping merge");
            simplified.push(record);
        } else {
            debug!(branch = %record.merge_branch, rev = %record.commit.revision, "superseded merge");
        }
    }

    simplified
}
