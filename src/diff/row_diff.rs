//! Record matching by fingerprint

use crate::snapshot::{Record, Snapshot};

/// Full outer join of two snapshots on fingerprint
pub struct RowMatcher;

impl RowMatcher {
    /// Match records between old and new snapshots.
    ///
    /// Returns `(Option<old>, Option<new>)` pairs: old records first in old
    /// order, then records only in `new`, in new order. Fingerprints are
    /// unique within a snapshot, so every record appears exactly once.
    pub fn match_rows<'a>(
        old: &'a Snapshot,
        new: &'a Snapshot,
    ) -> Vec<(Option<&'a Record>, Option<&'a Record>)> {
        let mut matches = Vec::with_capacity(old.len().max(new.len()));

        for old_record in old.records() {
            matches.push((Some(old_record), new.get(&old_record.fingerprint)));
        }

        for new_record in new.records() {
            if !old.contains(&new_record.fingerprint) {
                matches.push((None, Some(new_record)));
            }
        }

        matches
    }
}
