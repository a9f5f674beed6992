// Photo collection client

pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod upload;

pub use config::Settings;
pub use error::{Error, Result};
pub use state::AppState;
