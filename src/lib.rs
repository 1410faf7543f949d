//! Rich presence bridge from a running game session to Steam and Discord.
//!
//! Metadata objects in the level supply custom status text; the [`PresenceManager`]
//! coalesces their changes and publishes per-client presence through the enabled
//! [`PresenceProvider`]s.

pub mod discord;
pub mod error;
pub mod logging;
pub mod presence;
pub mod settings;
pub mod steam;

pub use error::PresenceError;
pub use presence::{
    start_presence_background_task, Client, ClientMask, EngineState, PresenceHandle,
    PresenceManager, PresenceProvider, SessionInfo, SourceId, SystemClock, UpdateEvent,
};
pub use settings::{load_settings, save_settings, PresenceSettings};

/// Build the providers compiled into this build whose backends are available.
///
/// A missing backend is logged and left out; the other clients still work.
#[cfg_attr(not(any(feature = "steam", feature = "discord")), allow(unused_variables))]
pub fn default_providers(
    settings: &PresenceSettings,
    game_title: &str,
) -> Vec<Box<dyn PresenceProvider>> {
    #[allow(unused_mut)]
    let mut providers: Vec<Box<dyn PresenceProvider>> = Vec::new();

    #[cfg(feature = "steam")]
    match steam::SteamState::init(settings.steam_app_id) {
        Ok(state) => providers.push(Box::new(steam::SteamPresence::new(
            std::sync::Arc::new(state),
            settings.steam_display.clone(),
        ))),
        Err(e) => tracing::warn!("{}", e),
    }

    #[cfg(feature = "discord")]
    match discord::DiscordPresence::new(settings.discord_app_id, game_title, settings.steam_app_id)
    {
        Ok(provider) => providers.push(Box::new(provider)),
        Err(e) => tracing::warn!("{}", e),
    }

    providers
}

/// Assemble a manager from settings, with the default providers and the wall clock.
///
/// Presence starts switched on or off according to `settings.enabled`.
pub fn build_presence_manager(
    settings: &PresenceSettings,
    engine: Box<dyn EngineState>,
) -> PresenceManager {
    let game_title = engine.game_title();
    let mut manager = PresenceManager::new(
        settings.branding.clone(),
        engine,
        Box::new(SystemClock::new()),
    );
    for provider in default_providers(settings, &game_title) {
        manager.add_provider(provider);
    }
    manager.on_feature_toggled(settings.enabled);
    manager
}
