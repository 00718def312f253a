use thiserror::Error;

pub type Result<T> = std::result::Result<T, AvatarError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AvatarError {
    /// Animation was requested without a live audio stream to drive it.
    #[error("no audio stream attached; cannot start avatar animation")]
    MissingAudioStream,
    /// A per-tick operation ran before a session was started.
    #[error("no active animation session")]
    NoSession,
    #[error("failed to load avatar from {url}: {reason}")]
    AssetLoad { url: String, reason: String },
    #[error("settings store error: {0}")]
    Settings(String),
    #[error("signaling error: {0}")]
    Signaling(String),
}

impl From<serde_json::Error> for AvatarError {
    fn from(e: serde_json::Error) -> Self {
        AvatarError::Signaling(e.to_string())
    }
}
