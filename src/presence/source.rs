use std::fmt;

use super::client::ClientMask;
use super::debounce::DebounceState;
use super::render::clip_field;

/// Identity of the world object that owns a presence source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Custom presence text supplied by a metadata object in the level
#[derive(Debug, Clone)]
pub struct PresenceSource {
    id: SourceId,
    state: String,
    details: String,
    mask: ClientMask,
    debounce: DebounceState,
}

impl PresenceSource {
    pub fn new(id: SourceId, mask: ClientMask, state: &str, details: &str) -> Self {
        Self {
            id,
            state: clip_field(state).to_string(),
            details: clip_field(details).to_string(),
            mask,
            debounce: DebounceState::new(),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn mask(&self) -> ClientMask {
        self.mask
    }

    pub fn set_state(&mut self, state: &str) {
        self.state = clip_field(state).to_string();
    }

    pub fn set_details(&mut self, details: &str) {
        self.details = clip_field(details).to_string();
    }

    pub fn set_mask(&mut self, mask: ClientMask) {
        self.mask = mask;
    }

    pub fn debounce(&self) -> &DebounceState {
        &self.debounce
    }

    pub fn debounce_mut(&mut self) -> &mut DebounceState {
        &mut self.debounce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::render::MAX_FIELD_LEN;

    #[test]
    fn test_fields_are_bounded() {
        let long = "x".repeat(300);
        let mut source = PresenceSource::new(SourceId(1), ClientMask::ALL, &long, "short");
        assert_eq!(source.state().len(), MAX_FIELD_LEN);
        assert_eq!(source.details(), "short");

        source.set_details(&long);
        assert_eq!(source.details().len(), MAX_FIELD_LEN);
        assert!(!source.debounce().is_pending());
    }
}
