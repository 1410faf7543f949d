#[cfg(feature = "discord")]
pub mod presence;

#[cfg(feature = "discord")]
pub use presence::DiscordPresence;
