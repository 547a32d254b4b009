//! One check run: fingerprint the new table, diff it against the stored
//! snapshot, build the reports, then save the new snapshot.
//!
//! Every fallible step before the save happens first, so a run that fails
//! early leaves the stored snapshot untouched. Report columns are checked
//! against the new schema only; removed records saved under an older schema
//! show null for columns that schema lacks. On a first run (nothing stored
//! yet) the diff is still computed, but it is discarded: the new snapshot
//! becomes the baseline and no differences are reported.

use crate::diff::{DiffEngine, DiffResult};
use crate::error::CheckError;
use crate::model::Table;
use crate::report::{ReportFormatter, ReportSection};
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;

/// What a check run found and did
#[derive(Debug)]
pub struct CheckOutcome {
    /// The diff against the prior snapshot; `None` when the baseline was seeded
    pub diff: Option<DiffResult>,
    /// Grouped reports, one per non-empty section
    pub sections: Vec<ReportSection>,
    /// True when there was no prior snapshot to compare against
    pub baseline_seeded: bool,
    /// True when the new snapshot was written to the store
    pub saved: bool,
}

impl CheckOutcome {
    /// Check if the run reported any differences
    pub fn has_changes(&self) -> bool {
        !self.sections.is_empty()
    }
}

/// Options for a check run
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Skip saving the new snapshot
    pub dry_run: bool,
}

/// Run a check of `table` against the snapshot in `store`
pub fn run_check<S>(
    store: &mut S,
    table: &Table,
    formatter: &ReportFormatter,
    options: CheckOptions,
) -> Result<CheckOutcome, CheckError>
where
    S: SnapshotStore + ?Sized,
{
    let new = Snapshot::from_table(table)?;
    formatter.validate(new.columns())?;

    let old = store.current().map_err(CheckError::StoreRead)?;
    let diff = DiffEngine::new().diff(&old, &new);
    let baseline_seeded = old.is_empty();

    let mut sections = Vec::new();
    let diff = if baseline_seeded {
        tracing::info!(records = new.len(), "no prior snapshot, seeding baseline");
        None
    } else {
        for change in &diff.schema_changes {
            tracing::warn!(%change, "schema changed since the last snapshot");
        }
        for (label, columns, records) in diff.sections() {
            sections.push(ReportSection {
                label: label.to_string(),
                report: formatter.format(columns, records),
            });
        }
        tracing::info!(
            added = diff.stats.rows_added,
            removed = diff.stats.rows_removed,
            unchanged = diff.stats.rows_unchanged,
            "compared against prior snapshot"
        );
        Some(diff)
    };

    let saved = if options.dry_run {
        tracing::info!("dry run, snapshot not saved");
        false
    } else {
        store.replace(&new).map_err(CheckError::StoreWrite)?;
        true
    };

    Ok(CheckOutcome {
        diff,
        sections,
        baseline_seeded,
        saved,
    })
}
