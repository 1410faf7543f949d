use std::sync::Arc;

use crate::presence::{Client, PresenceProvider, RenderedPresence};

use super::SteamState;

/// Steam rich presence through the friends API
pub struct SteamPresence {
    state: Arc<SteamState>,
    display_token: String,
}

impl SteamPresence {
    pub fn new(state: Arc<SteamState>, display_token: String) -> Self {
        Self {
            state,
            display_token,
        }
    }

    fn set(&self, key: &str, value: &str) {
        if !self.state.client().friends().set_rich_presence(key, Some(value)) {
            tracing::debug!("Steam rejected rich presence key {}", key);
        }
    }
}

impl PresenceProvider for SteamPresence {
    fn client(&self) -> Client {
        Client::Steam
    }

    fn init(&self) {
        self.clear_presence();
    }

    fn update_presence(&self, presence: &RenderedPresence) {
        tracing::debug!("Setting Steam presence: {}", presence.details);

        self.set("gamestatus", &presence.details);
        self.set("status", &presence.state);
        self.set("steam_display", &self.display_token);

        let Some(group) = &presence.player_group else {
            return;
        };
        match &group.group_id {
            Some(group_id) => {
                self.set("steam_player_group", group_id);
                self.set("steam_player_group_size", &group.size.to_string());
            }
            None => tracing::warn!("Steam presence cannot update player count (no server id)"),
        }
    }

    fn clear_presence(&self) {
        self.state.client().friends().clear_rich_presence();
    }

    fn shutdown(&self) {
        self.clear_presence();
    }

    fn run_callbacks(&self) {
        self.state.run_callbacks();
    }
}
