//! Provider double shared by the presence tests

use std::sync::{Arc, Mutex};

use super::client::Client;
use super::traits::{PresenceProvider, RenderedPresence};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    Update(RenderedPresence),
    Clear,
    Shutdown,
}

/// Records every call it receives
pub struct RecordingProvider {
    client: Client,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingProvider {
    pub fn new(client: Client) -> (Self, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                client,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl PresenceProvider for RecordingProvider {
    fn client(&self) -> Client {
        self.client
    }

    fn init(&self) {
        self.calls.lock().unwrap().push(Call::Init);
    }

    fn update_presence(&self, presence: &RenderedPresence) {
        self.calls.lock().unwrap().push(Call::Update(presence.clone()));
    }

    fn clear_presence(&self) {
        self.calls.lock().unwrap().push(Call::Clear);
    }

    fn shutdown(&self) {
        self.calls.lock().unwrap().push(Call::Shutdown);
    }
}

/// Presence payloads published so far
pub fn updates(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<RenderedPresence> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|call| match call {
            Call::Update(presence) => Some(presence.clone()),
            _ => None,
        })
        .collect()
}
