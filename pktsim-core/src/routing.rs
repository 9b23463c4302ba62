//! Forwarding decision of a [`Node`].
//!
//! Every time a node has to send a packet that is not addressed to itself
//! the [`Network`] asks its [`Router`] which incident link to use. The
//! router only picks the next link, computing routes across the whole
//! network is left to the implementations.
//!
//! [`Network`]: crate::network::Network

use crate::{
    link::LinkId,
    network::Packet,
    node::{Address, Node, NodeId},
};
use std::collections::HashMap;

/// The forwarding strategy of the nodes of a [`Network`].
///
/// Set with [`Network::set_router`]. The default is [`FirstLink`].
///
/// [`Network`]: crate::network::Network
/// [`Network::set_router`]: crate::network::Network::set_router
pub trait Router {
    /// Select the link `node` forwards `packet` on.
    ///
    /// `previous_hop` is the node the packet was received from, `None`
    /// when `node` originates the packet. Returning `None` means there
    /// is no route: the packet is dropped and counted as such. The
    /// returned link must be one of `node.links()`.
    fn choose_next_link(
        &self,
        node: &Node,
        packet: &Packet,
        previous_hop: Option<NodeId>,
    ) -> Option<LinkId>;
}

/// Forward on the first attached link that does not lead back to the
/// previous hop.
///
/// This does not look at the destination of the packet at all. It
/// delivers on any single link network and along chains, anything else
/// needs a smarter [`Router`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLink;

impl Router for FirstLink {
    fn choose_next_link(
        &self,
        node: &Node,
        _packet: &Packet,
        previous_hop: Option<NodeId>,
    ) -> Option<LinkId> {
        node.links()
            .iter()
            .copied()
            .find(|link| link.other(node.id()) != previous_hop)
    }
}

/// Next hops configured by hand, per node and destination address.
///
/// ```
/// # use pktsim_core::routing::StaticRoutes;
/// # use pktsim_core::node::NodeId;
/// let mut routes = StaticRoutes::new();
/// # let (a, b) = (NodeId::ZERO, NodeId::ONE);
/// routes.add_route(a, "10.0.0.9".parse().unwrap(), b);
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticRoutes {
    next_hops: HashMap<(NodeId, Address), NodeId>,
    fallback: Option<FirstLink>,
}

impl StaticRoutes {
    /// routes without entries drop the packet
    pub fn new() -> Self {
        Self::default()
    }

    /// routes without entries are forwarded with [`FirstLink`]
    pub fn with_fallback() -> Self {
        Self {
            next_hops: HashMap::new(),
            fallback: Some(FirstLink),
        }
    }

    /// Packets for `destination` leaving `node` go to `next_hop`.
    ///
    /// Returns the previous next hop, if any.
    pub fn add_route(
        &mut self,
        node: NodeId,
        destination: Address,
        next_hop: NodeId,
    ) -> Option<NodeId> {
        self.next_hops.insert((node, destination), next_hop)
    }
}

impl Router for StaticRoutes {
    fn choose_next_link(
        &self,
        node: &Node,
        packet: &Packet,
        previous_hop: Option<NodeId>,
    ) -> Option<LinkId> {
        let configured = self
            .next_hops
            .get(&(node.id(), packet.destination()))
            .map(|next_hop| LinkId::new((node.id(), *next_hop)))
            .filter(|link| node.links().contains(link));

        match (configured, self.fallback) {
            (Some(link), _) => Some(link),
            (None, Some(fallback)) => fallback.choose_next_link(node, packet, previous_hop),
            (None, None) => None,
        }
    }
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn choose_next_link(
        &self,
        node: &Node,
        packet: &Packet,
        previous_hop: Option<NodeId>,
    ) -> Option<LinkId> {
        (**self).choose_next_link(node, packet, previous_hop)
    }
}
