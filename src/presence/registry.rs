//! Which metadata source is active for each client

use super::client::{Client, ClientMask};
use super::source::SourceId;

/// A source displaced from a client slot by a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub client: Client,
    pub previous: SourceId,
}

/// One slot per client, each holding at most one active source
#[derive(Debug, Default)]
pub struct SourceRegistry {
    slots: [Option<SourceId>; Client::COUNT],
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `source` the active source for every client in `mask`.
    ///
    /// Returns the sources that were replaced so the caller can carry over their timers.
    pub fn register(&mut self, source: SourceId, mask: ClientMask) -> Vec<Eviction> {
        let mut evicted = Vec::new();

        for client in mask.iter() {
            let slot = &mut self.slots[client.index()];
            match *slot {
                Some(previous) if previous == source => continue,
                Some(previous) => {
                    tracing::warn!(
                        "Metadata source for {} already exists ({}), replacing with {}",
                        client,
                        previous,
                        source
                    );
                    evicted.push(Eviction { client, previous });
                }
                None => {}
            }

            tracing::debug!("Source {} becoming metadata source for {}", source, client);
            *slot = Some(source);
        }

        evicted
    }

    /// Clear every slot held by `source`. Returns the clients it was removed from.
    pub fn unregister(&mut self, source: SourceId) -> ClientMask {
        let mut cleared = ClientMask::EMPTY;
        for client in Client::ALL {
            let slot = &mut self.slots[client.index()];
            if *slot == Some(source) {
                *slot = None;
                cleared.insert(client);
            }
        }
        cleared
    }

    pub fn active_source(&self, client: Client) -> Option<SourceId> {
        self.slots[client.index()]
    }

    /// Clients for which `source` is currently active
    pub fn held_by(&self, source: SourceId) -> ClientMask {
        Client::ALL
            .into_iter()
            .filter(|client| self.slots[client.index()] == Some(source))
            .collect()
    }
}
