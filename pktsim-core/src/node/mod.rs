mod id;

pub use self::id::NodeId;
use crate::link::LinkId;
use std::net::IpAddr;

/// Routable identifier of a [`Node`], used as source and destination
/// of a [`Packet`](crate::network::Packet).
pub type Address = IpAddr;

/// A simulated host managed by the [`Network`].
///
/// A `Node` does not own its links: it keeps the [`LinkId`]s of the links
/// it is an endpoint of, the [`Link`]s themselves live in the network. The
/// order in which the links were attached is kept, this is the order the
/// default [`Router`] walks them in.
///
/// You never construct a `Node` directly, use [`Network::new_node`].
///
/// [`Network`]: crate::network::Network
/// [`Network::new_node`]: crate::network::Network::new_node
/// [`Link`]: crate::link::Link
/// [`Router`]: crate::routing::Router
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    address: Address,
    links: Vec<LinkId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, address: Address) -> Self {
        Self {
            id,
            address,
            links: Vec::new(),
        }
    }

    /// Returns the unique identifier of this node.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    /// The links this node is an endpoint of, in attachment order.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Attach a link to this node.
    ///
    /// Attaching the same link twice is a no-op. Returns `true` if the link
    /// was not attached yet.
    pub(crate) fn add_link(&mut self, link: LinkId) -> bool {
        debug_assert!(link.contains(self.id), "{link} is not incident to {}", self.id);

        if self.links.contains(&link) {
            false
        } else {
            self.links.push(link);
            true
        }
    }

    /// label used in the [`Topology`](crate::topology::Topology) view
    pub fn label(&self) -> String {
        format!("Node{}\n{}", self.id, self.address)
    }
}
