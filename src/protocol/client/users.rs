// Identity calls

use super::ScriptClient;
use crate::error::{Error, Result};
use crate::protocol::constants::RemoteFunction;
use crate::protocol::types::{CreateUserReply, NewUser, UserData};
use serde_json::json;
use tracing::{debug, info};

impl ScriptClient {
    /// Fetch the user row for `user_id`. The backend creates the row on first
    /// contact, so `None` only comes back for an empty or rejected identity.
    pub async fn get_user_data(&self, user_id: &str) -> Result<Option<UserData>> {
        let user: Option<UserData> = self
            .call(RemoteFunction::GetUserData, vec![json!(user_id)])
            .await?;

        match &user {
            Some(data) => debug!(
                user_id = %data.user_id,
                images = data.images,
                ranking = data.ranking,
                "user checked in"
            ),
            None => debug!(user_id, "backend returned no user data"),
        }

        Ok(user)
    }

    pub async fn register_user(&self, user: NewUser) -> Result<String> {
        info!(nickname = %user.nickname, "registering new user");

        let reply: CreateUserReply = self
            .call(RemoteFunction::CreateUser, vec![serde_json::to_value(&user)?])
            .await?;

        match reply {
            CreateUserReply {
                success: true,
                user_id: Some(user_id),
                ..
            } => Ok(user_id),
            CreateUserReply { message, .. } => Err(Error::Remote {
                function: RemoteFunction::CreateUser.name().to_string(),
                message: message.unwrap_or_else(|| "user registration rejected".to_string()),
            }),
        }
    }
}
