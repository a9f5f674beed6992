// Batched registration and upload of a selection snapshot

use super::encoder;
use super::ledger::{Outcome, SendSession};
use super::selection::SelectedFile;
use crate::error::{Error, Result};
use crate::protocol::{Backend, UploadForm};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Drives one send from open to settle.
///
/// Phases:
/// 1. Open the session: one `Pending` entry per file, dialog visible
/// 2. Check the identity in once; a failed call fails every entry and stops
/// 3. Per batch of `batch_size` files, in order:
///    - register that many records; failure fails everything unresolved and stops
///    - encode and upload every file of the batch together; each file settles on
///      its own and the next batch waits for all of them
/// 4. Settle: every entry is `Succeeded` or `Failed`
///
/// The orchestrator loop is the only writer of the ledger. Upload futures return
/// their outcome and the loop publishes a new session value for each one.
pub struct Orchestrator<'a, B: Backend> {
    backend: &'a B,
    batch_size: usize,
    ledger: &'a watch::Sender<SendSession>,
}

impl<'a, B: Backend> Orchestrator<'a, B> {
    pub fn new(backend: &'a B, batch_size: usize, ledger: &'a watch::Sender<SendSession>) -> Self {
        Self {
            backend,
            batch_size: batch_size.max(1),
            ledger,
        }
    }

    /// Send every file in `snapshot` on behalf of `identity`.
    ///
    /// Remote failures never escape as errors; they end up in the returned
    /// ledger. The only error is trying to open a session while one is still
    /// visible.
    pub async fn run(&self, snapshot: &[SelectedFile], identity: &str) -> Result<SendSession> {
        self.open(snapshot)?;
        self.process(snapshot, identity).await
    }

    /// Publish a fresh session for `snapshot` with the dialog visible.
    /// Fails with `Error::SessionActive` while a previous dialog is still up.
    pub fn open(&self, snapshot: &[SelectedFile]) -> Result<()> {
        let mut opened = false;
        self.ledger.send_if_modified(|current| {
            if current.dialog_visible {
                return false;
            }
            *current = SendSession::open(snapshot);
            opened = true;
            true
        });

        if !opened {
            return Err(Error::SessionActive);
        }

        info!(
            files = snapshot.len(),
            batch_size = self.batch_size,
            "send session opened"
        );
        Ok(())
    }

    /// Drive a session already opened for this same `snapshot` until it settles.
    pub async fn process(&self, snapshot: &[SelectedFile], identity: &str) -> Result<SendSession> {
        if let Err(e) = self.check_in(identity).await {
            error!(error = %e, "check-in failed, aborting send");
            return Ok(self.abort());
        }

        for (batch_index, batch) in snapshot.chunks(self.batch_size).enumerate() {
            let start = batch_index * self.batch_size;
            let ids = match self.register(identity, batch.len()).await {
                Ok(ids) => ids,
                Err(e) => {
                    error!(
                        batch = batch_index + 1,
                        error = %e,
                        "record registration failed, aborting remaining batches"
                    );
                    return Ok(self.abort());
                }
            };

            self.update(|session| session.with_record_ids(start, &ids));
            info!(batch = batch_index + 1, size = batch.len(), "batch registered");

            self.upload_batch(start, batch, &ids).await;
        }

        let session = self.current();
        let progress = session.progress();
        info!(
            total = progress.total,
            failed = progress.failed,
            "send session settled"
        );
        Ok(session)
    }

    // Any successful reply is an acknowledgement, even an empty one
    async fn check_in(&self, identity: &str) -> Result<()> {
        match self.backend.check_in(identity).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                warn!(identity, "check-in acknowledged without user data");
                Ok(())
            }
            Err(e) => Err(Error::CheckIn(e.to_string())),
        }
    }

    async fn register(&self, identity: &str, amount: usize) -> Result<Vec<String>> {
        let ids = self
            .backend
            .register_records(identity, amount)
            .await
            .map_err(|e| match e {
                Error::Registration(_) => e,
                other => Error::Registration(other.to_string()),
            })?;

        // Ids are matched to files by position only
        if ids.len() != amount {
            return Err(Error::Registration(format!(
                "expected {} record ids, got {}",
                amount,
                ids.len()
            )));
        }

        Ok(ids)
    }

    async fn upload_batch(&self, start: usize, batch: &[SelectedFile], ids: &[String]) {
        let mut uploads: FuturesUnordered<_> = batch
            .iter()
            .zip(ids)
            .enumerate()
            .map(|(offset, (file, record_id))| async move {
                (start + offset, self.upload_one(file, record_id).await)
            })
            .collect();

        while let Some((index, outcome)) = uploads.next().await {
            self.update(|session| session.with_outcome(index, outcome));
        }
    }

    async fn upload_one(&self, file: &SelectedFile, record_id: &str) -> Outcome {
        let encoded = match encoder::encode(file).await {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(file = file.name(), error = %e, "could not encode file");
                return Outcome::Failed;
            }
        };

        let form = UploadForm {
            filename: file.name().to_string(),
            data: encoded.data,
        };

        match self.backend.upload_file(record_id, form).await {
            Ok(true) => Outcome::Succeeded,
            Ok(false) => {
                warn!(file = file.name(), record_id, "upload rejected");
                Outcome::Failed
            }
            Err(e) => {
                warn!(file = file.name(), record_id, error = %e, "upload failed");
                Outcome::Failed
            }
        }
    }

    fn abort(&self) -> SendSession {
        self.update(SendSession::with_unresolved_failed);
        self.current()
    }

    fn current(&self) -> SendSession {
        self.ledger.borrow().clone()
    }

    // Build the next value from the current one, then publish it whole
    fn update(&self, next: impl FnOnce(&SendSession) -> SendSession) {
        let next = {
            let current = self.ledger.borrow();
            next(&current)
        };
        self.ledger.send_replace(next);
    }
}
