// Script execution client implementation

mod images;
mod stats;
mod users;

use super::backend::Backend;
use super::constants::RemoteFunction;
use super::types::{NewUser, RankingRow, Summary, UploadForm, UserData};
use crate::config::Settings;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Talks to the deployed script through its execution endpoint.
///
/// Every remote function is invoked with a JSON body of the form
/// `{"function": name, "parameters": [...]}`; the reply is an execution envelope
/// carrying either `response.result` or an `error` object.
#[derive(Clone)]
pub struct ScriptClient {
    http: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecutionEnvelope {
    #[serde(default)]
    response: Option<ExecutionResult>,
    #[serde(default)]
    error: Option<ExecutionError>,
}

#[derive(Debug, Deserialize)]
struct ExecutionResult {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ExecutionError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}

impl ExecutionError {
    fn describe(&self) -> String {
        // Script exceptions put the useful text in details[].errorMessage
        let detail = self
            .details
            .iter()
            .find_map(|d| d.get("errorMessage").and_then(Value::as_str));

        match (detail, &self.message, self.code) {
            (Some(detail), _, _) => detail.to_string(),
            (None, Some(message), _) => message.clone(),
            (None, None, Some(code)) => format!("error code {}", code),
            (None, None, None) => "unknown script error".to_string(),
        }
    }
}

impl ScriptClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        if settings.endpoint.trim().is_empty() {
            return Err(Error::Config("no script endpoint configured".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if settings.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            bearer_token: settings.bearer_token.clone(),
        })
    }

    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        function: RemoteFunction,
        parameters: Vec<Value>,
    ) -> Result<T> {
        debug!(function = function.name(), "calling remote function");

        let body = serde_json::json!({
            "function": function.name(),
            "parameters": parameters,
        });

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let text = response.text().await?;

        decode_envelope(function, &text)
    }
}

fn decode_envelope<T: DeserializeOwned>(function: RemoteFunction, body: &str) -> Result<T> {
    let envelope: ExecutionEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.error {
        return Err(Error::Remote {
            function: function.name().to_string(),
            message: error.describe(),
        });
    }

    let result = envelope.response.map(|r| r.result).unwrap_or(Value::Null);
    Ok(serde_json::from_value(result)?)
}

impl Backend for ScriptClient {
    async fn check_in(&self, identity: &str) -> Result<Option<UserData>> {
        self.get_user_data(identity).await
    }

    async fn register_records(&self, identity: &str, amount: usize) -> Result<Vec<String>> {
        self.create_image_record(identity, amount).await
    }

    async fn upload_file(&self, record_id: &str, form: UploadForm) -> Result<bool> {
        self.image_upload(record_id, form).await
    }

    async fn get_summary(&self, identity: &str) -> Result<Option<Summary>> {
        self.summary(identity).await
    }

    async fn get_ranking(&self) -> Result<Option<Vec<RankingRow>>> {
        self.ranking().await
    }

    async fn create_user(&self, user: NewUser) -> Result<String> {
        self.register_user(user).await
    }
}
