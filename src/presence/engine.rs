//! Queries against the running game session

/// Read access to engine state needed for rendering presence
pub trait EngineState: Send {
    /// Currently loaded map, if any
    fn map_name(&self) -> Option<String>;

    /// Whether the loaded map is a main menu background
    fn is_menu_background(&self) -> bool;

    /// Session player capacity; 1 for singleplayer
    fn max_players(&self) -> u32;

    fn is_player_connected(&self, slot: u32) -> bool;

    /// Number of connected players, counted over the leading occupied slots
    fn player_count(&self) -> u32 {
        let max = self.max_players();
        (0..max).take_while(|slot| self.is_player_connected(*slot)).count() as u32
    }

    /// Game title as listed by the mod's game info
    fn game_title(&self) -> String;

    /// Account id of the game server, when known (multiplayer only)
    fn server_account_id(&self) -> Option<u32>;
}

/// Snapshot of engine state used for a single render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub map_name: Option<String>,
    pub is_menu_background: bool,
    pub player_count: u32,
    pub max_players: u32,
    pub game_title: String,
    pub server_account_id: Option<u32>,
}

impl SessionInfo {
    /// Capture the current engine state
    pub fn capture(engine: &dyn EngineState) -> Self {
        Self {
            map_name: engine.map_name(),
            is_menu_background: engine.is_menu_background(),
            player_count: engine.player_count(),
            max_players: engine.max_players(),
            game_title: engine.game_title(),
            server_account_id: engine.server_account_id(),
        }
    }

    /// Replace the map name with one supplied by the caller; `None` means no map
    pub fn with_map_name(mut self, map_name: Option<&str>) -> Self {
        self.map_name = map_name.map(str::to_string);
        self
    }

    pub fn is_multiplayer(&self) -> bool {
        self.max_players > 1
    }
}

impl EngineState for SessionInfo {
    fn map_name(&self) -> Option<String> {
        self.map_name.clone()
    }

    fn is_menu_background(&self) -> bool {
        self.is_menu_background
    }

    fn max_players(&self) -> u32 {
        self.max_players
    }

    fn is_player_connected(&self, slot: u32) -> bool {
        slot < self.player_count
    }

    fn player_count(&self) -> u32 {
        self.player_count
    }

    fn game_title(&self) -> String {
        self.game_title.clone()
    }

    fn server_account_id(&self) -> Option<u32> {
        self.server_account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slots {
        connected: Vec<bool>,
    }

    impl EngineState for Slots {
        fn map_name(&self) -> Option<String> {
            Some("d1_trainstation_01".to_string())
        }

        fn is_menu_background(&self) -> bool {
            false
        }

        fn max_players(&self) -> u32 {
            self.connected.len() as u32
        }

        fn is_player_connected(&self, slot: u32) -> bool {
            self.connected.get(slot as usize).copied().unwrap_or(false)
        }

        fn game_title(&self) -> String {
            "Half-Life 2".to_string()
        }

        fn server_account_id(&self) -> Option<u32> {
            None
        }
    }

    #[test]
    fn test_player_count_stops_at_first_free_slot() {
        let engine = Slots {
            connected: vec![true, true, false, true],
        };
        assert_eq!(engine.player_count(), 2);

        let full = Slots {
            connected: vec![true; 4],
        };
        assert_eq!(full.player_count(), 4);
    }

    #[test]
    fn test_capture_reads_engine_map() {
        let engine = Slots {
            connected: vec![true, false],
        };
        let session = SessionInfo::capture(&engine);
        assert_eq!(session.map_name.as_deref(), Some("d1_trainstation_01"));
        assert_eq!(session.player_count, 1);
        assert!(session.is_multiplayer());
        assert_eq!(session.game_title, "Half-Life 2");
    }

    #[test]
    fn test_explicit_map_name_replaces_engine_map() {
        let engine = Slots {
            connected: vec![true],
        };
        let session = SessionInfo::capture(&engine).with_map_name(Some("background01"));
        assert_eq!(session.map_name.as_deref(), Some("background01"));

        let session = SessionInfo::capture(&engine).with_map_name(None);
        assert_eq!(session.map_name, None);
        assert_eq!(session.game_title, "Half-Life 2");
    }
}
