//! Fans rendered presence out to the enabled client backends

use super::client::{Client, ClientMask};
use super::engine::SessionInfo;
use super::render::render;
use super::source::PresenceSource;
use super::traits::{PresenceProvider, UpdateEvent};
use crate::settings::Branding;

/// Lifecycle of a single client backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Disabled,
    Initializing,
    Active,
}

struct ProviderSlot {
    provider: Box<dyn PresenceProvider>,
    status: ClientStatus,
}

/// Owns the provider list and the global enable toggle
pub struct ClientDispatcher {
    providers: Vec<ProviderSlot>,
    branding: Branding,
    enabled: bool,
}

impl ClientDispatcher {
    pub fn new(branding: Branding) -> Self {
        Self {
            providers: Vec::new(),
            branding,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Add a provider. It is initialized straight away if presence is enabled.
    pub fn add_provider(&mut self, provider: Box<dyn PresenceProvider>) {
        tracing::info!("Adding presence provider: {}", provider.name());
        let mut slot = ProviderSlot {
            provider,
            status: ClientStatus::Disabled,
        };
        if self.enabled {
            Self::start(&mut slot);
        }
        self.providers.push(slot);
    }

    pub fn status(&self, client: Client) -> Option<ClientStatus> {
        self.providers
            .iter()
            .find(|slot| slot.provider.client() == client)
            .map(|slot| slot.status)
    }

    fn start(slot: &mut ProviderSlot) {
        slot.status = ClientStatus::Initializing;
        slot.provider.init();
        slot.status = ClientStatus::Active;
        tracing::debug!("{} presence active", slot.provider.name());
    }

    fn stop(slot: &mut ProviderSlot) {
        if slot.status == ClientStatus::Disabled {
            return;
        }
        slot.provider.clear_presence();
        slot.provider.shutdown();
        slot.status = ClientStatus::Disabled;
        tracing::debug!("{} presence disabled", slot.provider.name());
    }

    /// Switch every backend on or off. Returns true if the toggle changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;

        tracing::info!(
            "Rich presence {}",
            if enabled { "enabled" } else { "disabled" }
        );
        for slot in &mut self.providers {
            if enabled {
                Self::start(slot);
            } else {
                Self::stop(slot);
            }
        }
        true
    }

    /// Render and publish presence for each active client in `mask`.
    ///
    /// `resolve` looks up the active metadata source of a client.
    pub fn dispatch<'a>(
        &self,
        mask: ClientMask,
        event: UpdateEvent,
        session: &SessionInfo,
        resolve: impl Fn(Client) -> Option<&'a PresenceSource>,
    ) {
        if !self.enabled {
            return;
        }

        for slot in &self.providers {
            let client = slot.provider.client();
            if !mask.contains(client) || slot.status != ClientStatus::Active {
                continue;
            }

            tracing::debug!("Updating {} presence ({:?})", client, event);
            let presence = render(client, resolve(client), event, session, &self.branding);
            slot.provider.update_presence(&presence);
        }
    }

    pub fn run_callbacks(&self) {
        for slot in &self.providers {
            if slot.status == ClientStatus::Active {
                slot.provider.run_callbacks();
            }
        }
    }
}
