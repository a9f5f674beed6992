// Photo collection backend wire types
use serde::{Deserialize, Deserializer, Serialize};

/// Payload carried by an upload call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadForm {
    pub filename: String,
    /// Standard base64, no data-URL prefix
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UploadReply {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "count_field")]
    pub images: u64,
    #[serde(default, deserialize_with = "count_field")]
    pub ranking: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub student_number: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReply {
    pub success: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(deserialize_with = "count_field")]
    pub number_of_images: u64,
    #[serde(deserialize_with = "count_field")]
    pub number_of_users: u64,
    #[serde(default, deserialize_with = "count_field")]
    pub user_images: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    #[serde(rename = "userId")]
    pub identity: String,
    #[serde(rename = "images", deserialize_with = "count_field")]
    pub image_count: u64,
    #[serde(rename = "ranking", deserialize_with = "count_field")]
    pub rank: u64,
}

/// Aggregate replies come either bare or wrapped in `{success, data}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Availability<T> {
    Wrapped {
        success: bool,
        data: Option<T>,
    },
    Bare(T),
}

impl<T> Availability<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Wrapped { success: true, data } => data,
            Availability::Wrapped { success: false, .. } => None,
            Availability::Bare(value) => Some(value),
        }
    }
}

// Spreadsheet cells come back as numbers or as formatted strings
fn count_field<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
        Empty(()),
    }

    match Cell::deserialize(deserializer)? {
        Cell::Number(n) if n >= 0.0 => Ok(n as u64),
        Cell::Number(_) => Ok(0),
        Cell::Text(s) if s.trim().is_empty() => Ok(0),
        // Formula errors such as #N/A count as zero
        Cell::Text(s) => Ok(s.trim().parse::<f64>().map_or(0, |n| n.max(0.0) as u64)),
        Cell::Empty(()) => Ok(0),
    }
}
