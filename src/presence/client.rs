//! The closed set of rich presence clients and masks over it

use std::fmt;
use std::ops::BitOr;

/// An external rich presence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Client {
    Steam = 0,
    Discord = 1,
}

impl Client {
    pub const COUNT: usize = 2;
    pub const ALL: [Client; Client::COUNT] = [Client::Steam, Client::Discord];

    pub fn name(self) -> &'static str {
        match self {
            Client::Steam => "Steam",
            Client::Discord => "Discord",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of clients, one bit per [`Client`] ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientMask(u8);

impl ClientMask {
    pub const EMPTY: ClientMask = ClientMask(0);
    pub const ALL: ClientMask = ClientMask((1 << Client::COUNT) - 1);

    /// Build a mask from raw bits (e.g. replicated spawnflags). Unknown bits are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, client: Client) -> bool {
        self.0 & client.bit() != 0
    }

    pub fn insert(&mut self, client: Client) {
        self.0 |= client.bit();
    }

    pub fn remove(&mut self, client: Client) {
        self.0 &= !client.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersection(self, other: ClientMask) -> ClientMask {
        ClientMask(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Client> {
        Client::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Client> for ClientMask {
    fn from(client: Client) -> Self {
        ClientMask(client.bit())
    }
}

impl BitOr for ClientMask {
    type Output = ClientMask;

    fn bitor(self, rhs: ClientMask) -> ClientMask {
        ClientMask(self.0 | rhs.0)
    }
}

impl BitOr<Client> for ClientMask {
    type Output = ClientMask;

    fn bitor(self, rhs: Client) -> ClientMask {
        self | ClientMask::from(rhs)
    }
}

impl FromIterator<Client> for ClientMask {
    fn from_iter<I: IntoIterator<Item = Client>>(iter: I) -> Self {
        let mut mask = ClientMask::EMPTY;
        for client in iter {
            mask.insert(client);
        }
        mask
    }
}

impl fmt::Display for ClientMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Client::name).collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bits_drop_unknown_clients() {
        let mask = ClientMask::from_bits(0xff);
        assert_eq!(mask, ClientMask::ALL);
        assert_eq!(mask.bits(), 0b11);

        let steam_only = ClientMask::from_bits(0b0000_0101);
        assert!(steam_only.contains(Client::Steam));
        assert!(!steam_only.contains(Client::Discord));
    }

    #[test]
    fn test_mask_iteration_follows_ordinals() {
        let mask: ClientMask = [Client::Discord, Client::Steam].into_iter().collect();
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![Client::Steam, Client::Discord]);
        assert_eq!(mask.to_string(), "Steam|Discord");
        assert_eq!(ClientMask::EMPTY.to_string(), "none");
    }

    #[test]
    fn test_insert_remove() {
        let mut mask = ClientMask::EMPTY | Client::Discord;
        assert!(!mask.is_empty());
        mask.remove(Client::Discord);
        assert!(mask.is_empty());
        mask.insert(Client::Steam);
        assert_eq!(mask.intersection(ClientMask::ALL), ClientMask::from(Client::Steam));
    }
}
