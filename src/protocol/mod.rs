// Photo collection backend protocol

pub mod backend;
pub mod client;
pub mod constants;
pub mod types;

pub use backend::Backend;
pub use client::ScriptClient;
pub use constants::{DEFAULT_BATCH_SIZE, MAX_FILES};
pub use types::{NewUser, RankingRow, Summary, UploadForm, UserData};
