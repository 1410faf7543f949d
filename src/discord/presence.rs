//! Discord Rich Presence integration using discord-sdk

use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    registration::{Application, LaunchCommand},
    wheel::{UserState, Wheel},
    Discord, Subscriptions,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::PresenceError;
use crate::presence::{Client, PresenceProvider, RenderedPresence};

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

enum DiscordCommand {
    Update(RenderedPresence),
    Clear,
}

/// Discord presence provider. SDK calls run on a background task so updates never block.
pub struct DiscordPresence {
    app_id: i64,
    /// Shown as elapsed time; fixed for the whole process
    start_timestamp: i64,
    runtime: Handle,
    update_tx: Mutex<Option<mpsc::UnboundedSender<DiscordCommand>>>,
}

impl DiscordPresence {
    /// Create the provider, registering the app so Discord can launch it through Steam.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        app_id: i64,
        game_title: &str,
        steam_app_id: Option<u32>,
    ) -> Result<Self, PresenceError> {
        let runtime = Handle::try_current()
            .map_err(|e| PresenceError::backend_unavailable(Client::Discord, e))?;

        if let Some(steam_app_id) = steam_app_id {
            if let Err(e) = discord_sdk::registration::register_app(Application {
                id: app_id,
                name: Some(game_title.to_string()),
                command: LaunchCommand::Steam(steam_app_id),
            }) {
                tracing::warn!("Failed to register Discord app: {:?}", e);
            }
        }

        let start_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        Ok(Self {
            app_id,
            start_timestamp,
            runtime,
            update_tx: Mutex::new(None),
        })
    }

    fn send(&self, command: DiscordCommand) {
        let mut update_tx = self.update_tx.lock().unwrap();
        let Some(tx) = update_tx.as_ref() else {
            tracing::debug!("Discord presence not initialized; skipping update");
            return;
        };

        if tx.send(command).is_err() {
            // The task has exited; forget it so the next init starts a new one
            tracing::debug!("Discord task is gone; dropping update");
            *update_tx = None;
        }
    }

    /// Background task that maintains the Discord connection and processes presence updates
    async fn run_discord_task(
        app_id: i64,
        start_timestamp: i64,
        mut update_rx: mpsc::UnboundedReceiver<DiscordCommand>,
    ) {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));

        let mut user_spoke = wheel.user();

        let discord = match Discord::new(app_id, Subscriptions::ACTIVITY, Box::new(handler)) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Discord not available: {:?}", e);
                return;
            }
        };

        tracing::info!("Discord connecting...");

        let user = match tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                Err("Discord connection closed".to_string())
            } else {
                match &*user_spoke.0.borrow() {
                    UserState::Connected(user) => Ok(user.clone()),
                    UserState::Disconnected(err) => Err(format!("Discord disconnected: {:?}", err)),
                }
            }
        })
        .await
        {
            Ok(Ok(user)) => user,
            Ok(Err(e)) => {
                tracing::warn!("{}", e);
                return;
            }
            Err(_) => {
                tracing::warn!("Discord handshake timed out");
                return;
            }
        };

        tracing::info!(
            "Discord Rich Presence connected as {}#{}",
            user.username,
            user.discriminator.unwrap_or(0)
        );

        loop {
            let command = tokio::select! {
                command = update_rx.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
                changed = user_spoke.0.changed() => {
                    if changed.is_err() {
                        tracing::warn!("Discord connection closed");
                        break;
                    }
                    match &*user_spoke.0.borrow() {
                        UserState::Connected(user) => {
                            tracing::info!("Discord reconnected as {}", user.username);
                        }
                        UserState::Disconnected(err) => {
                            tracing::warn!("Discord disconnected: {:?}", err);
                        }
                    }
                    continue;
                }
            };

            let result = match command {
                DiscordCommand::Update(presence) => {
                    let mut assets = Assets::default().large(
                        presence.large_image.key.as_str(),
                        Some(presence.large_image.text.as_str()),
                    );
                    if !presence.small_image.key.is_empty() {
                        assets = assets.small(
                            presence.small_image.key.as_str(),
                            Some(presence.small_image.text.as_str()),
                        );
                    }

                    let activity = ActivityBuilder::new()
                        .state(presence.state.as_str())
                        .details(presence.details.as_str())
                        .start_timestamp(start_timestamp)
                        .assets(assets);
                    discord.update_activity(activity).await.map(|_| ())
                }
                DiscordCommand::Clear => discord.clear_activity().await.map(|_| ()),
            };

            if let Err(e) = result {
                tracing::debug!("Failed to update Discord activity: {:?}", e);
            }
        }

        discord.disconnect().await;
        tracing::info!("Discord Rich Presence disconnected");
    }
}

impl PresenceProvider for DiscordPresence {
    fn client(&self) -> Client {
        Client::Discord
    }

    fn init(&self) {
        let mut update_tx = self.update_tx.lock().unwrap();
        if update_tx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.runtime
            .spawn(Self::run_discord_task(self.app_id, self.start_timestamp, rx));
        *update_tx = Some(tx);
    }

    fn update_presence(&self, presence: &RenderedPresence) {
        self.send(DiscordCommand::Update(presence.clone()));
    }

    fn clear_presence(&self) {
        self.send(DiscordCommand::Clear);
    }

    fn shutdown(&self) {
        // Dropping the sender ends the task once queued commands are flushed
        self.update_tx.lock().unwrap().take();
    }
}
