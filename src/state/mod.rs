// Application state management

mod identity;

pub use identity::{IdentityStore, IDENTITY_FILE};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::protocol::{Backend, NewUser, RankingRow, Summary};
use crate::upload::{
    recover, AddOutcome, Orchestrator, PreviewProvider, PreviewRegistry, Recovery, SelectedFile,
    SelectionManager, SendSession,
};
use tokio::sync::{watch, RwLock};
use tracing::info;

/// Owns everything the front end drives: the selection, the live send session
/// and the identity used for remote calls.
///
/// The selection belongs to the selection manager until a send starts. While
/// the session dialog is visible the selection is read-only; closing the
/// dialog folds the ledger back into it.
pub struct AppState<B: Backend, P: PreviewProvider = PreviewRegistry> {
    backend: B,
    settings: Settings,
    identity: RwLock<IdentityStore>,
    selection: RwLock<SelectionManager<P>>,
    session: watch::Sender<SendSession>,
}

impl<B: Backend> AppState<B, PreviewRegistry> {
    pub fn new(backend: B, settings: Settings, identity: IdentityStore) -> Self {
        Self::with_previews(backend, settings, identity, PreviewRegistry::new())
    }
}

impl<B: Backend, P: PreviewProvider> AppState<B, P> {
    pub fn with_previews(backend: B, settings: Settings, identity: IdentityStore, previews: P) -> Self {
        let (session, _) = watch::channel(SendSession::closed());
        let selection = SelectionManager::new(previews, settings.max_files);

        Self {
            backend,
            settings,
            identity: RwLock::new(identity),
            selection: RwLock::new(selection),
            session,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn identity(&self) -> Option<String> {
        self.identity.read().await.user_id().map(str::to_string)
    }

    pub async fn register_user(&self, student_number: String, nickname: String) -> Result<String> {
        let user_id = self
            .backend
            .create_user(NewUser {
                student_number,
                nickname,
            })
            .await?;

        self.identity.write().await.set(user_id.clone())?;
        info!(%user_id, "identity registered");
        Ok(user_id)
    }

    // Edits check the session under the write guard; `send` opens it under the read guard
    pub async fn add_files(&self, files: Vec<SelectedFile>) -> Result<AddOutcome> {
        let mut selection = self.selection.write().await;
        self.ensure_no_session()?;
        Ok(selection.add(files))
    }

    pub async fn remove_file(&self, index: usize) -> Result<Option<SelectedFile>> {
        let mut selection = self.selection.write().await;
        self.ensure_no_session()?;
        Ok(selection.remove_at(index))
    }

    pub async fn clear_files(&self) -> Result<()> {
        let mut selection = self.selection.write().await;
        self.ensure_no_session()?;
        selection.clear_all();
        Ok(())
    }

    pub async fn selected_files(&self) -> Vec<SelectedFile> {
        self.selection.read().await.snapshot()
    }

    pub async fn preview_urls(&self) -> Vec<String> {
        self.selection
            .read()
            .await
            .previews()
            .iter()
            .map(|p| p.url())
            .collect()
    }

    /// Live view of the send session. Every ledger change is published.
    pub fn subscribe(&self) -> watch::Receiver<SendSession> {
        self.session.subscribe()
    }

    pub fn session(&self) -> SendSession {
        self.session.borrow().clone()
    }

    /// Send the current selection. Returns once every entry has settled; the
    /// dialog stays open until `close_dialog`.
    pub async fn send(&self) -> Result<SendSession> {
        let identity = self.identity().await.ok_or(Error::MissingIdentity)?;

        let orchestrator = Orchestrator::new(&self.backend, self.settings.batch_size, &self.session);

        let snapshot = {
            let selection = self.selection.read().await;
            let snapshot = selection.snapshot();
            if snapshot.is_empty() {
                return Err(Error::EmptySelection);
            }
            orchestrator.open(&snapshot)?;
            snapshot
        };

        orchestrator.process(&snapshot, &identity).await
    }

    /// Dismiss a settled session. Failed files stay selected, everything else
    /// leaves the selection.
    pub async fn close_dialog(&self) -> Result<Recovery> {
        // Held across the swap so a new send never sees the pre-recovery selection
        let mut selection = self.selection.write().await;

        let mut closed = Err(Error::NoSession);
        self.session.send_if_modified(|current| {
            if !current.dialog_visible {
                return false;
            }
            if !current.is_settled() {
                closed = Err(Error::SessionInProgress);
                return false;
            }
            closed = Ok(std::mem::replace(current, SendSession::closed()));
            true
        });
        let session = closed?;

        // Ledger entries line up with the snapshot taken at send time
        let snapshot: Vec<SelectedFile> = session.entries.iter().map(|e| e.file.clone()).collect();
        let recovery = recover(&snapshot, &session.entries);

        match &recovery {
            Recovery::AllSucceeded => selection.clear_all(),
            Recovery::Retry(files) => selection.replace(files.clone()),
        }

        info!(kept = selection.len(), "send session closed");
        Ok(recovery)
    }

    pub async fn summary(&self) -> Result<Option<Summary>> {
        let identity = self.identity().await.ok_or(Error::MissingIdentity)?;
        self.backend.get_summary(&identity).await
    }

    pub async fn ranking(&self) -> Result<Option<Vec<RankingRow>>> {
        self.backend.get_ranking().await
    }

    fn ensure_no_session(&self) -> Result<()> {
        if self.session.borrow().dialog_visible {
            Err(Error::SessionActive)
        } else {
            Ok(())
        }
    }
}
