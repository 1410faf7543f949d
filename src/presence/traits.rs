use super::client::Client;

/// What triggered a presence update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateEvent {
    /// Presence was just switched on, usually before any level is loaded
    Init,
    LevelInit,
    LevelShutdown,
    /// A metadata source changed or a periodic refresh
    Update,
}

/// An image shown next to the presence text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAsset {
    pub key: String,
    pub text: String,
}

/// Steam player group fields for multiplayer sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerGroup {
    /// Server account id; `None` when the server identity is unavailable
    pub group_id: Option<String>,
    pub size: u32,
    pub capacity: u32,
}

/// Client-ready presence fields, recomputed for every emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPresence {
    pub state: String,
    pub details: String,
    pub small_image: ImageAsset,
    pub large_image: ImageAsset,
    pub player_group: Option<PlayerGroup>,
}

/// Trait for presence providers (Steam, Discord)
pub trait PresenceProvider: Send + Sync {
    /// The client this provider publishes to
    fn client(&self) -> Client;

    /// Returns the name of this presence provider (for logging)
    fn name(&self) -> &'static str {
        self.client().name()
    }

    /// Prepare the backend: clear stale presence, hook up SDK callbacks
    fn init(&self);

    /// Publish rendered presence
    fn update_presence(&self, presence: &RenderedPresence);

    /// Clear all presence data
    fn clear_presence(&self);

    /// Release the backend; `init` may be called again later
    fn shutdown(&self);

    /// Pump SDK callbacks, for backends that need it
    fn run_callbacks(&self) {}
}
