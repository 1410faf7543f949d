use crate::presence::Client;

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("{client} backend unavailable: {reason}")]
    BackendUnavailable { client: Client, reason: String },
}

impl PresenceError {
    pub fn backend_unavailable(client: Client, reason: impl std::fmt::Display) -> Self {
        Self::BackendUnavailable {
            client,
            reason: reason.to_string(),
        }
    }
}
