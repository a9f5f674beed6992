// Remote procedure names and client-side limits

/// Maximum number of files a selection may hold
pub const MAX_FILES: usize = 100;

/// Files registered and uploaded per wave
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Ranking replies are cut to this many rows
pub const RANKING_LIMIT: usize = 10;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFunction {
    GetUserData,
    CreateUser,
    CreateImageRecord,
    ImageUpload,
    GetSummary,
    GetRanking,
}

impl RemoteFunction {
    pub fn name(self) -> &'static str {
        match self {
            RemoteFunction::GetUserData => "getUserData",
            RemoteFunction::CreateUser => "createUser",
            RemoteFunction::CreateImageRecord => "createImageRecord",
            RemoteFunction::ImageUpload => "imageUpload",
            RemoteFunction::GetSummary => "getSummary",
            RemoteFunction::GetRanking => "getRanking",
        }
    }
}
