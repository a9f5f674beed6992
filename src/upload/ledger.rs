// Per-send status ledger

use super::selection::SelectedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub filename: String,
    pub file: SelectedFile,
    pub record_id: Option<String>,
    pub outcome: Outcome,
}

impl LedgerEntry {
    fn pending(file: &SelectedFile) -> Self {
        Self {
            filename: file.name().to_string(),
            file: file.clone(),
            record_id: None,
            outcome: Outcome::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    pub failed: usize,
    pub percent: f64,
}

/// State of one send, from the moment it starts until the dialog is dismissed.
///
/// Values are never edited in place by the orchestrator. Each update builds a
/// new session from the previous one, replacing only the entry at a given
/// index, and publishes the whole value.
#[derive(Debug, Clone, Default)]
pub struct SendSession {
    pub entries: Vec<LedgerEntry>,
    pub dialog_visible: bool,
}

impl SendSession {
    pub fn open(snapshot: &[SelectedFile]) -> Self {
        Self {
            entries: snapshot.iter().map(LedgerEntry::pending).collect(),
            dialog_visible: true,
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }

    /// Write `ids` into the entries starting at `start`, one per position.
    pub fn with_record_ids(&self, start: usize, ids: &[String]) -> Self {
        let mut next = self.clone();
        for (offset, id) in ids.iter().enumerate() {
            if let Some(entry) = next.entries.get_mut(start + offset) {
                entry.record_id = Some(id.clone());
            }
        }
        next
    }

    /// Resolve the entry at `index`. An entry that already left `Pending` keeps
    /// its first outcome.
    pub fn with_outcome(&self, index: usize, outcome: Outcome) -> Self {
        let mut next = self.clone();
        if let Some(entry) = next.entries.get_mut(index) {
            if entry.outcome == Outcome::Pending {
                entry.outcome = outcome;
            }
        }
        next
    }

    /// Fail every entry that is still pending.
    pub fn with_unresolved_failed(&self) -> Self {
        let mut next = self.clone();
        for entry in next.entries.iter_mut().filter(|e| e.outcome == Outcome::Pending) {
            entry.outcome = Outcome::Failed;
        }
        next
    }

    pub fn is_settled(&self) -> bool {
        self.entries.iter().all(|e| e.outcome != Outcome::Pending)
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome == Outcome::Failed)
            .map(|e| e.filename.as_str())
            .collect()
    }

    pub fn progress(&self) -> Progress {
        let total = self.entries.len();
        let processed = self
            .entries
            .iter()
            .filter(|e| e.outcome != Outcome::Pending)
            .count();
        let failed = self
            .entries
            .iter()
            .filter(|e| e.outcome == Outcome::Failed)
            .count();
        let percent = if total == 0 {
            0.0
        } else {
            processed as f64 / total as f64 * 100.0
        };

        Progress {
            processed,
            total,
            failed,
            percent,
        }
    }
}
