// Image record and upload calls

use super::ScriptClient;
use crate::error::{Error, Result};
use crate::protocol::constants::RemoteFunction;
use crate::protocol::types::{RegisterReply, UploadForm, UploadReply};
use serde_json::json;
use tracing::{debug, warn};

impl ScriptClient {
    /// Pre-create `amount` image rows for `user_id`.
    /// Returns the row ids in creation order.
    pub async fn create_image_record(&self, user_id: &str, amount: usize) -> Result<Vec<String>> {
        debug!(user_id, amount, "creating image records");

        let reply: RegisterReply = self
            .call(
                RemoteFunction::CreateImageRecord,
                vec![json!(user_id), json!(amount)],
            )
            .await?;

        match reply {
            RegisterReply {
                success: true,
                ids: Some(ids),
                ..
            } => Ok(ids),
            RegisterReply { success: true, ids: None, .. } => Err(Error::Registration(
                "backend acknowledged registration without record ids".to_string(),
            )),
            RegisterReply { message, .. } => Err(Error::Registration(
                message.unwrap_or_else(|| "backend rejected registration".to_string()),
            )),
        }
    }

    pub async fn image_upload(&self, record_id: &str, form: UploadForm) -> Result<bool> {
        debug!(record_id, filename = %form.filename, bytes = form.data.len(), "uploading image");

        let filename = form.filename.clone();
        let reply: UploadReply = self
            .call(
                RemoteFunction::ImageUpload,
                vec![json!(record_id), serde_json::to_value(form)?],
            )
            .await?;

        if !reply.success {
            warn!(record_id, %filename, "backend rejected upload");
        }

        Ok(reply.success)
    }
}
