mod client;
mod debounce;
mod dispatch;
mod engine;
mod manager;
mod registry;
mod render;
mod source;
mod traits;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientMask};
pub use debounce::{Clock, DebounceState, ManualClock, SystemClock, UPDATE_COOLDOWN, UPDATE_WAIT};
pub use dispatch::{ClientDispatcher, ClientStatus};
pub use engine::{EngineState, SessionInfo};
pub use manager::{start_presence_background_task, PresenceCommand, PresenceHandle, PresenceManager};
pub use registry::{Eviction, SourceRegistry};
pub use render::{clip_field, render, MAX_FIELD_LEN};
pub use source::{PresenceSource, SourceId};
pub use traits::{ImageAsset, PlayerGroup, PresenceProvider, RenderedPresence, UpdateEvent};
