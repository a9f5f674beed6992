// Working set of files chosen for upload

use std::collections::{HashMap, HashSet};
use std::fmt;
use crate::protocol::MAX_FILES;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A chosen file. The name is its identity: two files with the same name are
/// the same entry as far as the selection is concerned.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            name,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

/// Display resource for one selected file. Deliberately not `Clone`: a handle is
/// given back to its provider exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: u64,
    file_name: String,
}

impl PreviewHandle {
    pub fn new(id: u64, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn url(&self) -> String {
        format!("preview://{}", self.id)
    }
}

pub trait PreviewProvider: Send + Sync {
    fn acquire(&self, file: &SelectedFile) -> PreviewHandle;
    fn release(&self, handle: PreviewHandle);
}

impl<P: PreviewProvider> PreviewProvider for Arc<P> {
    fn acquire(&self, file: &SelectedFile) -> PreviewHandle {
        (**self).acquire(file)
    }

    fn release(&self, handle: PreviewHandle) {
        (**self).release(handle)
    }
}

/// Hands out preview handles and keeps track of the ones still alive.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, String>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl PreviewProvider for PreviewRegistry {
    fn acquire(&self, file: &SelectedFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, file.name().to_string());
        PreviewHandle::new(id, file.name())
    }

    fn release(&self, handle: PreviewHandle) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&handle.id);
        if removed.is_none() {
            warn!(id = handle.id, "released a preview that was not live");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapWarning {
    pub limit: usize,
    pub dropped: usize,
}

impl fmt::Display for CapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files capped at {} ({} not added)",
            self.limit, self.dropped
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    pub added: usize,
    pub duplicates: usize,
    pub capped: Option<CapWarning>,
}

pub struct SelectionManager<P: PreviewProvider> {
    files: Vec<SelectedFile>,
    previews: Vec<PreviewHandle>,
    provider: P,
    max_files: usize,
}

impl<P: PreviewProvider> SelectionManager<P> {
    /// `max_files` is held to `1..=MAX_FILES` whatever the caller asks for.
    pub fn new(provider: P, max_files: usize) -> Self {
        Self {
            files: Vec::new(),
            previews: Vec::new(),
            provider,
            max_files: max_files.clamp(1, MAX_FILES),
        }
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        &self.previews
    }

    pub fn snapshot(&self) -> Vec<SelectedFile> {
        self.files.clone()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Merge `incoming` after the current files. The first file seen under a
    /// name wins, so existing entries always beat new ones. Anything past
    /// `max_files` is dropped from the end.
    pub fn add(&mut self, incoming: impl IntoIterator<Item = SelectedFile>) -> AddOutcome {
        let before = self.files.len();
        let merged: Vec<SelectedFile> = self.files.iter().cloned().chain(incoming).collect();
        let merged_len = merged.len();

        let mut merged = dedup_by_name(merged);
        let duplicates = merged_len - merged.len();

        let capped = if merged.len() > self.max_files {
            let warning = CapWarning {
                limit: self.max_files,
                dropped: merged.len() - self.max_files,
            };
            merged.truncate(self.max_files);
            warn!(limit = warning.limit, dropped = warning.dropped, "selection capped");
            Some(warning)
        } else {
            None
        };

        self.set(merged);

        let outcome = AddOutcome {
            added: self.files.len() - before,
            duplicates,
            capped,
        };
        debug!(?outcome, total = self.files.len(), "files added to selection");
        outcome
    }

    /// Remove the file at `index`. Out of range is a no-op returning `None`.
    pub fn remove_at(&mut self, index: usize) -> Option<SelectedFile> {
        if index >= self.files.len() {
            return None;
        }

        let mut files = self.files.clone();
        let removed = files.remove(index);
        self.set(files);
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        self.set(Vec::new());
    }

    /// Swap in a new working set, keeping the name and size invariants.
    pub fn replace(&mut self, files: Vec<SelectedFile>) {
        let mut files = dedup_by_name(files);
        files.truncate(self.max_files);
        self.set(files);
    }

    // Every change releases all previews before creating the new ones
    fn set(&mut self, files: Vec<SelectedFile>) {
        self.release_previews();
        self.previews = files.iter().map(|f| self.provider.acquire(f)).collect();
        self.files = files;
    }

    fn release_previews(&mut self) {
        for handle in self.previews.drain(..) {
            self.provider.release(handle);
        }
    }
}

impl<P: PreviewProvider> Drop for SelectionManager<P> {
    fn drop(&mut self) {
        self.release_previews();
    }
}

fn dedup_by_name(files: Vec<SelectedFile>) -> Vec<SelectedFile> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|f| seen.insert(f.name.clone()))
        .collect()
}
