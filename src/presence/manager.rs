//! Owns metadata sources, their timers and the client dispatcher

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::client::{Client, ClientMask};
use super::debounce::Clock;
use super::dispatch::{ClientDispatcher, ClientStatus};
use super::engine::{EngineState, SessionInfo};
use super::registry::SourceRegistry;
use super::source::{PresenceSource, SourceId};
use super::traits::{PresenceProvider, UpdateEvent};
use crate::settings::Branding;

/// How often SDK callbacks are pumped by the background task
const CALLBACK_INTERVAL: Duration = Duration::from_millis(100);

/// Presence service: receives metadata lifecycle events and emits throttled updates
pub struct PresenceManager {
    registry: SourceRegistry,
    sources: HashMap<SourceId, PresenceSource>,
    dispatcher: ClientDispatcher,
    engine: Box<dyn EngineState>,
    clock: Box<dyn Clock>,
}

impl PresenceManager {
    pub fn new(branding: Branding, engine: Box<dyn EngineState>, clock: Box<dyn Clock>) -> Self {
        Self {
            registry: SourceRegistry::new(),
            sources: HashMap::new(),
            dispatcher: ClientDispatcher::new(branding),
            engine,
            clock,
        }
    }

    pub fn add_provider(&mut self, provider: Box<dyn PresenceProvider>) {
        self.dispatcher.add_provider(provider);
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    pub fn client_status(&self, client: Client) -> Option<ClientStatus> {
        self.dispatcher.status(client)
    }

    pub fn active_source(&self, client: Client) -> Option<&PresenceSource> {
        self.registry
            .active_source(client)
            .and_then(|id| self.sources.get(&id))
    }

    pub fn source(&self, id: SourceId) -> Option<&PresenceSource> {
        self.sources.get(&id)
    }

    /// A metadata object appeared, claiming the clients in `mask`
    pub fn on_metadata_created(
        &mut self,
        id: SourceId,
        mask: ClientMask,
        state: &str,
        details: &str,
    ) {
        tracing::debug!("Metadata source {} created for {}", id, mask);

        match self.sources.get_mut(&id) {
            Some(existing) => {
                // Recreated with a possibly different mask; claim slots afresh
                self.registry.unregister(id);
                existing.set_mask(mask);
                existing.set_state(state);
                existing.set_details(details);
            }
            None => {
                self.sources
                    .insert(id, PresenceSource::new(id, mask, state, details));
            }
        }

        for eviction in self.registry.register(id, mask) {
            // A replaced source gives up every client, not just the contested one
            let previous_id = eviction.previous;
            self.registry.unregister(previous_id);

            let Some(previous) = self.sources.get_mut(&previous_id) else {
                continue;
            };
            previous.debounce_mut().cancel();
            let inherited = previous.debounce().clone();

            if let Some(source) = self.sources.get_mut(&id) {
                source.debounce_mut().inherit_cooldown(&inherited);
            }
        }

        self.schedule(id);
    }

    /// Both text fields of a metadata object changed
    pub fn on_metadata_changed(&mut self, id: SourceId, state: &str, details: &str) {
        self.modify(id, |source| {
            source.set_state(state);
            source.set_details(details);
        });
    }

    /// Level script input setting the state line
    pub fn set_state(&mut self, id: SourceId, state: &str) {
        self.modify(id, |source| source.set_state(state));
    }

    /// Level script input setting the details line
    pub fn set_details(&mut self, id: SourceId, details: &str) {
        self.modify(id, |source| source.set_details(details));
    }

    fn modify(&mut self, id: SourceId, apply: impl FnOnce(&mut PresenceSource)) {
        let Some(source) = self.sources.get_mut(&id) else {
            tracing::warn!("Ignoring change for unknown metadata source {}", id);
            return;
        };
        apply(source);
        self.schedule(id);
    }

    fn schedule(&mut self, id: SourceId) {
        let now = self.clock.now();
        if let Some(source) = self.sources.get_mut(&id) {
            let due = source.debounce_mut().on_source_changed(now);
            tracing::debug!(
                "Metadata {} changed; updating in {:.2}s",
                id,
                due.saturating_sub(now).as_secs_f32()
            );
        }
    }

    /// The metadata object is gone; drop it and any pending update
    pub fn on_metadata_destroyed(&mut self, id: SourceId) {
        let cleared = self.registry.unregister(id);
        if self.sources.remove(&id).is_some() {
            tracing::debug!("Metadata source {} destroyed (was active for {})", id, cleared);
        }
    }

    /// Feature toggle. Turning on re-initializes the backends and publishes an Init update.
    pub fn on_feature_toggled(&mut self, enabled: bool) {
        if !self.dispatcher.set_enabled(enabled) {
            return;
        }
        if enabled {
            let session = SessionInfo::capture(self.engine.as_ref());
            self.dispatch(ClientMask::ALL, UpdateEvent::Init, &session);
        }
    }

    /// Publish to every client right away, e.g. on level transitions
    pub fn force_update(&self, event: UpdateEvent, map_name: Option<&str>) {
        self.force_update_mask(ClientMask::ALL, event, map_name);
    }

    /// Publish to the clients in `mask`. `map_name` is rendered as given; `None` shows as N/A.
    pub fn force_update_mask(&self, mask: ClientMask, event: UpdateEvent, map_name: Option<&str>) {
        let session = SessionInfo::capture(self.engine.as_ref()).with_map_name(map_name);
        self.dispatch(mask, event, &session);
    }

    fn dispatch(&self, mask: ClientMask, event: UpdateEvent, session: &SessionInfo) {
        self.dispatcher
            .dispatch(mask, event, session, |client| self.active_source(client));
    }

    /// Earliest pending update, on this manager's clock
    pub fn next_deadline(&self) -> Option<Duration> {
        self.sources
            .values()
            .filter_map(|source| source.debounce().due_at())
            .min()
    }

    /// Fire every update that is due
    pub fn tick(&mut self) {
        let now = self.clock.now();

        let mut due: Vec<(Duration, SourceId)> = self
            .sources
            .values()
            .filter(|source| source.debounce().is_due(now))
            .filter_map(|source| source.debounce().due_at().map(|at| (at, source.id())))
            .collect();
        due.sort();

        if due.is_empty() {
            return;
        }

        let session = SessionInfo::capture(self.engine.as_ref());
        for (_, id) in due {
            let Some(source) = self.sources.get_mut(&id) else {
                continue;
            };
            source.debounce_mut().fire(now);
            let mask = source.mask().intersection(self.registry.held_by(id));

            if mask.is_empty() {
                tracing::debug!("Metadata source {} no longer active for any client", id);
                continue;
            }
            self.dispatch(mask, UpdateEvent::Update, &session);
        }
    }

    pub fn run_callbacks(&self) {
        self.dispatcher.run_callbacks();
    }

    fn apply(&mut self, command: PresenceCommand) {
        match command {
            PresenceCommand::Created {
                id,
                mask,
                state,
                details,
            } => self.on_metadata_created(id, mask, &state, &details),
            PresenceCommand::Changed { id, state, details } => {
                self.on_metadata_changed(id, &state, &details)
            }
            PresenceCommand::SetState { id, state } => self.set_state(id, &state),
            PresenceCommand::SetDetails { id, details } => self.set_details(id, &details),
            PresenceCommand::Destroyed(id) => self.on_metadata_destroyed(id),
            PresenceCommand::Toggled(enabled) => self.on_feature_toggled(enabled),
            PresenceCommand::ForceUpdate {
                mask,
                event,
                map_name,
            } => self.force_update_mask(mask, event, map_name.as_deref()),
        }
    }
}

/// Messages accepted by the background task
#[derive(Debug, Clone)]
pub enum PresenceCommand {
    Created {
        id: SourceId,
        mask: ClientMask,
        state: String,
        details: String,
    },
    Changed {
        id: SourceId,
        state: String,
        details: String,
    },
    SetState {
        id: SourceId,
        state: String,
    },
    SetDetails {
        id: SourceId,
        details: String,
    },
    Destroyed(SourceId),
    Toggled(bool),
    ForceUpdate {
        mask: ClientMask,
        event: UpdateEvent,
        map_name: Option<String>,
    },
}

/// Cheap handle for feeding the background task from engine callbacks
#[derive(Debug, Clone)]
pub struct PresenceHandle {
    tx: mpsc::UnboundedSender<PresenceCommand>,
}

impl PresenceHandle {
    pub fn send(&self, command: PresenceCommand) {
        if self.tx.send(command).is_err() {
            tracing::debug!("Presence task has stopped; dropping command");
        }
    }

    pub fn metadata_created(&self, id: SourceId, mask: ClientMask, state: &str, details: &str) {
        self.send(PresenceCommand::Created {
            id,
            mask,
            state: state.to_string(),
            details: details.to_string(),
        });
    }

    pub fn metadata_changed(&self, id: SourceId, state: &str, details: &str) {
        self.send(PresenceCommand::Changed {
            id,
            state: state.to_string(),
            details: details.to_string(),
        });
    }

    pub fn set_state(&self, id: SourceId, state: &str) {
        self.send(PresenceCommand::SetState {
            id,
            state: state.to_string(),
        });
    }

    pub fn set_details(&self, id: SourceId, details: &str) {
        self.send(PresenceCommand::SetDetails {
            id,
            details: details.to_string(),
        });
    }

    pub fn metadata_destroyed(&self, id: SourceId) {
        self.send(PresenceCommand::Destroyed(id));
    }

    pub fn feature_toggled(&self, enabled: bool) {
        self.send(PresenceCommand::Toggled(enabled));
    }

    pub fn force_update(&self, event: UpdateEvent, map_name: Option<&str>) {
        self.force_update_mask(ClientMask::ALL, event, map_name);
    }

    pub fn force_update_mask(&self, mask: ClientMask, event: UpdateEvent, map_name: Option<&str>) {
        self.send(PresenceCommand::ForceUpdate {
            mask,
            event,
            map_name: map_name.map(str::to_string),
        });
    }
}

async fn sleep_until_deadline(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

/// Start the background task that owns the manager.
///
/// Commands, timer wake-ups and SDK callback pumping are serialized on this one task.
/// It disables presence and exits once every handle is dropped.
pub fn start_presence_background_task(
    mut presence_manager: PresenceManager,
) -> (PresenceHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut callbacks = tokio::time::interval(CALLBACK_INTERVAL);
        callbacks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            let wait = presence_manager
                .next_deadline()
                .map(|due| due.saturating_sub(presence_manager.now()));

            tokio::select! {
                command = rx.recv() => match command {
                    Some(command) => presence_manager.apply(command),
                    None => break,
                },
                _ = sleep_until_deadline(wait) => presence_manager.tick(),
                _ = callbacks.tick() => presence_manager.run_callbacks(),
            }
        }

        presence_manager.on_feature_toggled(false);
        tracing::info!("Presence task stopped");
    });

    (PresenceHandle { tx }, task)
}
