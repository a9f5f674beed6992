// Folding a finished send back into the selection

use super::ledger::{LedgerEntry, Outcome};
use super::selection::SelectedFile;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub enum Recovery {
    /// Nothing failed, the selection can be emptied
    AllSucceeded,
    /// Files to keep selected for another attempt, in snapshot order
    Retry(Vec<SelectedFile>),
}

/// Keep exactly the snapshot files whose entry failed. Succeeded files leave
/// the selection for good.
pub fn recover(snapshot: &[SelectedFile], entries: &[LedgerEntry]) -> Recovery {
    let failed: HashSet<&str> = entries
        .iter()
        .filter(|e| e.outcome == Outcome::Failed)
        .map(|e| e.filename.as_str())
        .collect();

    if failed.is_empty() {
        return Recovery::AllSucceeded;
    }

    Recovery::Retry(
        snapshot
            .iter()
            .filter(|f| failed.contains(f.name()))
            .cloned()
            .collect(),
    )
}
