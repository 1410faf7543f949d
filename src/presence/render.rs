//! Turns metadata text and engine state into client-ready presence fields

use super::client::Client;
use super::engine::SessionInfo;
use super::source::PresenceSource;
use super::traits::{ImageAsset, PlayerGroup, RenderedPresence, UpdateEvent};
use crate::settings::Branding;

/// Longest text field, in bytes (a 128 byte buffer with its terminator)
pub const MAX_FIELD_LEN: usize = 127;

const MISSING_MAP: &str = "N/A";

/// Clip `text` to [`MAX_FIELD_LEN`] bytes without splitting a character
pub fn clip_field(text: &str) -> &str {
    if text.len() <= MAX_FIELD_LEN {
        return text;
    }
    let mut end = MAX_FIELD_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn clipped(text: String) -> String {
    if text.len() <= MAX_FIELD_LEN {
        text
    } else {
        clip_field(&text).to_string()
    }
}

fn default_details(event: UpdateEvent, has_source: bool, session: &SessionInfo) -> String {
    let map = session.map_name.as_deref().unwrap_or(MISSING_MAP);

    if session.is_menu_background {
        return format!("Main Menu ({})", map);
    }

    // A custom source only exists inside a level, so the event does not matter there
    match event {
        UpdateEvent::Init | UpdateEvent::LevelShutdown if !has_source => "Main Menu".to_string(),
        _ => map.to_string(),
    }
}

fn image(key: &str, text: &str) -> ImageAsset {
    ImageAsset {
        key: clip_field(key).to_string(),
        text: clip_field(text).to_string(),
    }
}

/// Render presence for one client.
///
/// `source` is the active metadata source for that client, if any.
pub fn render(
    client: Client,
    source: Option<&PresenceSource>,
    event: UpdateEvent,
    session: &SessionInfo,
    branding: &Branding,
) -> RenderedPresence {
    let mut details = match source {
        Some(source) if !source.details().is_empty() => source.details().to_string(),
        _ => default_details(event, source.is_some(), session),
    };

    let state = match source {
        Some(source) if !source.state().is_empty() => source.state().to_string(),
        _ => session.game_title.clone(),
    };

    let mut player_group = None;
    if session.is_multiplayer() {
        match client {
            Client::Discord => {
                details = format!(
                    "{} ({}/{})",
                    details, session.player_count, session.max_players
                );
            }
            Client::Steam => {
                player_group = Some(PlayerGroup {
                    group_id: session.server_account_id.map(|id| id.to_string()),
                    size: session.player_count,
                    capacity: session.max_players,
                });
            }
        }
    }

    RenderedPresence {
        state: clipped(state),
        details: clipped(details),
        small_image: image(&branding.small_image_key, &branding.small_image_text),
        large_image: image(&branding.large_image_key, &branding.large_image_text),
        player_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::client::ClientMask;
    use crate::presence::source::SourceId;

    fn session(map: Option<&str>, menu: bool) -> SessionInfo {
        SessionInfo {
            map_name: map.map(str::to_string),
            is_menu_background: menu,
            player_count: 1,
            max_players: 1,
            game_title: "Half-Life 2".to_string(),
            server_account_id: None,
        }
    }

    fn render_discord(
        source: Option<&PresenceSource>,
        event: UpdateEvent,
        session: &SessionInfo,
    ) -> RenderedPresence {
        render(Client::Discord, source, event, session, &Branding::default())
    }

    #[test]
    fn test_menu_background_without_source() {
        let rendered = render_discord(None, UpdateEvent::Update, &session(Some("test"), true));
        assert_eq!(rendered.details, "Main Menu (test)");
        assert_eq!(rendered.state, "Half-Life 2");

        let rendered = render_discord(None, UpdateEvent::LevelInit, &session(None, true));
        assert_eq!(rendered.details, "Main Menu (N/A)");
    }

    #[test]
    fn test_plain_map_name_on_update() {
        let rendered = render_discord(None, UpdateEvent::Update, &session(Some("test"), false));
        assert_eq!(rendered.details, "test");

        let steam = render(
            Client::Steam,
            None,
            UpdateEvent::LevelInit,
            &session(Some("test"), false),
            &Branding::default(),
        );
        assert_eq!(steam.details, "test");

        let rendered = render_discord(None, UpdateEvent::Update, &session(None, false));
        assert_eq!(rendered.details, "N/A");
    }

    #[test]
    fn test_init_and_shutdown_show_main_menu() {
        let s = session(Some("test"), false);
        assert_eq!(render_discord(None, UpdateEvent::Init, &s).details, "Main Menu");
        assert_eq!(render_discord(None, UpdateEvent::LevelShutdown, &s).details, "Main Menu");
    }

    #[test]
    fn test_source_text_wins() {
        let source = PresenceSource::new(SourceId(7), ClientMask::ALL, "Chapter 3", "Route Kanal");
        let s = session(Some("test"), true);
        let rendered = render_discord(Some(&source), UpdateEvent::Init, &s);
        assert_eq!(rendered.state, "Chapter 3");
        assert_eq!(rendered.details, "Route Kanal");
    }

    #[test]
    fn test_empty_source_fields_fall_back() {
        let source = PresenceSource::new(SourceId(7), ClientMask::ALL, "", "");
        let s = session(Some("d3_c17_01"), false);

        let rendered = render_discord(Some(&source), UpdateEvent::Init, &s);
        assert_eq!(rendered.state, "Half-Life 2");
        assert_eq!(rendered.details, "d3_c17_01");

        let s = session(Some("bg"), true);
        let rendered = render_discord(Some(&source), UpdateEvent::Update, &s);
        assert_eq!(rendered.details, "Main Menu (bg)");
    }

    #[test]
    fn test_occupancy_per_client_style() {
        let mut s = session(Some("dm_lockdown"), false);
        s.player_count = 3;
        s.max_players = 8;
        s.server_account_id = Some(90071);

        let discord = render(Client::Discord, None, UpdateEvent::Update, &s, &Branding::default());
        assert_eq!(discord.details, "dm_lockdown (3/8)");
        assert!(discord.player_group.is_none());

        let steam = render(Client::Steam, None, UpdateEvent::Update, &s, &Branding::default());
        assert_eq!(steam.details, "dm_lockdown");
        assert_eq!(
            steam.player_group,
            Some(PlayerGroup {
                group_id: Some("90071".to_string()),
                size: 3,
                capacity: 8,
            })
        );
    }

    #[test]
    fn test_steam_group_without_server_identity() {
        let mut s = session(Some("dm_lockdown"), false);
        s.player_count = 2;
        s.max_players = 16;

        let steam = render(Client::Steam, None, UpdateEvent::Update, &s, &Branding::default());
        let group = steam.player_group.expect("multiplayer session has a group");
        assert_eq!(group.group_id, None);
        assert_eq!(group.size, 2);
    }

    #[test]
    fn test_images_come_from_branding() {
        let branding = Branding {
            large_image_key: "ep2_icon".to_string(),
            large_image_text: "Episode Two".to_string(),
            small_image_key: String::new(),
            small_image_text: "discord.gg/SourceEngine".to_string(),
        };
        let rendered = render(
            Client::Discord,
            None,
            UpdateEvent::Init,
            &session(None, false),
            &branding,
        );
        assert_eq!(rendered.large_image.key, "ep2_icon");
        assert_eq!(rendered.large_image.text, "Episode Two");
        assert_eq!(rendered.small_image.key, "");
    }

    #[test]
    fn test_long_text_is_clipped_after_occupancy() {
        let mut s = session(Some(&"m".repeat(126)), false);
        s.player_count = 3;
        s.max_players = 8;

        let rendered = render(Client::Discord, None, UpdateEvent::Update, &s, &Branding::default());
        assert_eq!(rendered.details.len(), MAX_FIELD_LEN);
        assert!(rendered.details.starts_with(&"m".repeat(126)));
    }

    #[test]
    fn test_clip_respects_char_boundaries() {
        // 'é' is two bytes, so 64 of them straddle the limit
        let text = "é".repeat(64);
        let clipped = clip_field(&text);
        assert_eq!(clipped.len(), 126);
        assert_eq!(clip_field("short"), "short");
    }
}
