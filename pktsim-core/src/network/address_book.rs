use crate::{
    error::TopologyError,
    node::{Address, NodeId},
};
use std::collections::HashMap;

/// Address Book
///
/// Registry of the [`Address`] of every node of the network, for
/// looking up who owns the source or destination of a packet.
///
#[derive(Debug, Clone, Default)]
pub(crate) struct AddressBook {
    entries: HashMap<Address, NodeId>,
}

impl AddressBook {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// lookup an entry in the address book
    ///
    /// returns `None` if no node uses that address
    pub(crate) fn lookup(&self, address: &Address) -> Option<NodeId> {
        self.entries.get(address).copied()
    }

    /// like [`lookup`](Self::lookup) but with a [`TopologyError`]
    pub(crate) fn resolve(&self, address: Address) -> Result<NodeId, TopologyError> {
        self.lookup(&address)
            .ok_or(TopologyError::AddressNotFound { address })
    }

    /// register a new Address to Id.
    ///
    /// Addresses are unique: registering an address twice fails with
    /// [`TopologyError::DuplicateAddress`] and keeps the existing entry.
    pub(crate) fn register(&mut self, address: Address, id: NodeId) -> Result<(), TopologyError> {
        if let Some(node) = self.lookup(&address) {
            return Err(TopologyError::DuplicateAddress { address, node });
        }

        self.entries.insert(address, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut book = AddressBook::new();
        let address: Address = "10.0.0.1".parse().unwrap();

        assert_eq!(book.lookup(&address), None);
        book.register(address, NodeId::ONE).unwrap();
        assert_eq!(book.lookup(&address), Some(NodeId::ONE));
        assert_eq!(book.resolve(address), Ok(NodeId::ONE));
    }

    #[test]
    fn duplicate_address() {
        let mut book = AddressBook::new();
        let address: Address = "::1".parse().unwrap();

        book.register(address, NodeId::ONE).unwrap();
        let error = book.register(address, NodeId::ONE.next()).unwrap_err();

        assert_eq!(
            error,
            TopologyError::DuplicateAddress {
                address,
                node: NodeId::ONE
            }
        );
        assert_eq!(book.lookup(&address), Some(NodeId::ONE));
    }

    #[test]
    fn unknown_address() {
        let address: Address = "10.9.9.9".parse().unwrap();
        assert_eq!(
            AddressBook::new().resolve(address),
            Err(TopologyError::AddressNotFound { address })
        );
    }
}
