use steamworks::Client;

use crate::error::PresenceError;
use crate::presence::Client as PresenceClient;

/// Owns the Steam client for the lifetime of the process
pub struct SteamState {
    client: Client,
}

impl SteamState {
    /// Connect to the running Steam client, optionally for an explicit app id
    pub fn init(app_id: Option<u32>) -> Result<Self, PresenceError> {
        tracing::debug!("Initializing Steam client");
        let client = match app_id {
            Some(app_id) => Client::init_app(app_id),
            None => Client::init(),
        }
        .map_err(|e| PresenceError::backend_unavailable(PresenceClient::Steam, e))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn run_callbacks(&self) {
        self.client.run_callbacks();
    }
}
