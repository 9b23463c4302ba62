use super::Packet;
use crate::{error::StateError, node::NodeId, time::SimTime};

/// A node the packet went through and the time it got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub node: NodeId,
    pub time: SimTime,
}

/// A packet on its way through the network, with the hops it has
/// visited so far.
///
/// The first hop is the node that sent the packet.
#[derive(Debug, Clone)]
pub(crate) struct Transit {
    packet: Packet,
    hops: Vec<Hop>,
}

/// A packet that reached the node owning its destination address.
///
/// Handed to the handler of [`Network::run_with`].
///
/// [`Network::run_with`]: crate::network::Network::run_with
#[derive(Debug, Clone)]
pub struct Delivery {
    packet: Packet,
    hops: Vec<Hop>,
}

impl Transit {
    pub(crate) fn new(packet: Packet) -> Self {
        Self {
            packet,
            hops: Vec::new(),
        }
    }

    pub(crate) fn packet(&self) -> &Packet {
        &self.packet
    }

    /// the node the packet was received from by the node of the last hop
    pub(crate) fn previous_hop(&self) -> Option<NodeId> {
        self.hops.iter().rev().nth(1).map(|hop| hop.node)
    }

    pub(crate) fn visited(&self, node: NodeId) -> bool {
        self.hops.iter().any(|hop| hop.node == node)
    }

    pub(crate) fn push_hop(&mut self, node: NodeId, time: SimTime) {
        debug_assert!(
            self.hops.last().is_none_or(|last| last.time <= time),
            "hops of packet {} are going back in time",
            self.packet.id()
        );
        self.hops.push(Hop { node, time });
    }

    pub(crate) fn set_arrived(&mut self, time: SimTime) -> Result<(), StateError> {
        self.packet.set_arrived(time)
    }

    pub(crate) fn into_delivery(self) -> Delivery {
        Delivery {
            packet: self.packet,
            hops: self.hops,
        }
    }
}

impl Delivery {
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Every node the packet visited, sender first and destination last.
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn into_packet(self) -> Packet {
        self.packet
    }
}
