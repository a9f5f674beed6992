// Remote surface consumed by the uploader

use super::types::{NewUser, RankingRow, Summary, UploadForm, UserData};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;

/// One method per remote procedure. Every call is a single request/response with
/// no retry; failures come back as `Err` and the caller decides what they mean.
pub trait Backend: Send + Sync {
    /// Confirms the identity server-side, creating the user row on first sight.
    /// `None` means the backend does not know the identity.
    fn check_in(&self, identity: &str) -> impl Future<Output = Result<Option<UserData>>> + Send;

    /// Pre-creates `amount` record slots. Ids come back in slot order.
    fn register_records(
        &self,
        identity: &str,
        amount: usize,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Stores one image against a registered record. `Ok(false)` is a rejected upload.
    fn upload_file(
        &self,
        record_id: &str,
        form: UploadForm,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// `Ok(None)` when the backend reports the figures as unavailable.
    fn get_summary(&self, identity: &str) -> impl Future<Output = Result<Option<Summary>>> + Send;

    fn get_ranking(&self) -> impl Future<Output = Result<Option<Vec<RankingRow>>>> + Send;

    /// Registers a new user and returns the identity token to persist.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<String>> + Send;
}

impl<T: Backend> Backend for Arc<T> {
    fn check_in(&self, identity: &str) -> impl Future<Output = Result<Option<UserData>>> + Send {
        (**self).check_in(identity)
    }

    fn register_records(
        &self,
        identity: &str,
        amount: usize,
    ) -> impl Future<Output = Result<Vec<String>>> + Send {
        (**self).register_records(identity, amount)
    }

    fn upload_file(
        &self,
        record_id: &str,
        form: UploadForm,
    ) -> impl Future<Output = Result<bool>> + Send {
        (**self).upload_file(record_id, form)
    }

    fn get_summary(&self, identity: &str) -> impl Future<Output = Result<Option<Summary>>> + Send {
        (**self).get_summary(identity)
    }

    fn get_ranking(&self) -> impl Future<Output = Result<Option<Vec<RankingRow>>>> + Send {
        (**self).get_ranking()
    }

    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<String>> + Send {
        (**self).create_user(user)
    }
}
