use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PresenceError;

const SETTINGS_DIR: &str = "presence-bridge";
const SETTINGS_FILE: &str = "settings.json";

/// Discord application used when a mod does not register its own
pub const DEFAULT_DISCORD_APP_ID: i64 = 637699494229835787;

/// Images shown next to the presence text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub large_image_key: String,
    pub large_image_text: String,
    pub small_image_key: String,
    pub small_image_text: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            large_image_key: "default_icon".to_string(),
            large_image_text: "discord.gg/SourceEngine".to_string(),
            small_image_key: String::new(),
            small_image_text: "discord.gg/SourceEngine".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceSettings {
    /// Whether rich presence is published at all
    pub enabled: bool,
    pub discord_app_id: i64,
    /// Steam app id, used to init Steam and to let Discord launch the game through Steam
    pub steam_app_id: Option<u32>,
    /// Localization token for Steam's `steam_display` key
    pub steam_display: String,
    pub branding: Branding,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            discord_app_id: DEFAULT_DISCORD_APP_ID,
            steam_app_id: None,
            steam_display: "#SteamRPC_Status".to_string(),
            branding: Branding::default(),
        }
    }
}

/// Per-user settings location
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SETTINGS_DIR)
        .join(SETTINGS_FILE)
}

pub fn load_settings(path: &Path) -> Result<PresenceSettings, PresenceError> {
    tracing::debug!("Loading settings from {}", path.display());

    if !path.exists() {
        return Ok(PresenceSettings::default());
    }

    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn save_settings(path: &Path, settings: &PresenceSettings) -> Result<(), PresenceError> {
    tracing::debug!("Saving settings to {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, PresenceSettings::default());
        assert!(settings.enabled);
        assert_eq!(settings.discord_app_id, DEFAULT_DISCORD_APP_ID);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = PresenceSettings {
            enabled: false,
            steam_app_id: Some(243730),
            ..PresenceSettings::default()
        };
        save_settings(&path, &settings).unwrap();

        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "enabled": false, "branding": { "large_image_key": "ep1" } }"#)
            .unwrap();

        let settings = load_settings(&path).unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.branding.large_image_key, "ep1");
        assert_eq!(settings.branding.large_image_text, "discord.gg/SourceEngine");
        assert_eq!(settings.steam_display, "#SteamRPC_Status");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ enabled: ").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, PresenceError::SettingsParse(_)));
    }
}
