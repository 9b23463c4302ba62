use crate::node::NodeId;
use std::fmt;

/// Unique identifier of the link between two nodes
///
/// The link is bidirectional and is unique for two node. I.e.
/// For all nodes `n1` and `n2` the identifier `(n1, n2)` is the
/// same as the identifier `(n2, n1)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId {
    smaller_id: NodeId,
    larger_id: NodeId,
}

impl LinkId {
    /// create the link identifier from the given node tuple.
    ///
    /// ```
    /// # use pktsim_core::{link::LinkId, node::NodeId};
    /// # let n1 = NodeId::ZERO;
    /// # let n2 = NodeId::ONE;
    /// assert_eq!(LinkId::new((n1, n2)), LinkId::new((n2, n1)));
    /// ```
    pub fn new((a, b): (NodeId, NodeId)) -> Self {
        if a < b {
            Self {
                smaller_id: a,
                larger_id: b,
            }
        } else {
            Self {
                smaller_id: b,
                larger_id: a,
            }
        }
    }

    /// get the [`NodeId`]s that compose this link identifier,
    /// smallest first
    #[inline]
    pub fn into_nodes(self) -> (NodeId, NodeId) {
        (self.smaller_id, self.larger_id)
    }

    /// `true` if `node` is one of the two ends of this link
    #[inline]
    pub fn contains(self, node: NodeId) -> bool {
        self.smaller_id == node || self.larger_id == node
    }

    /// The end of the link that is not `node`.
    ///
    /// Returns `None` if `node` is not an end of this link.
    ///
    /// ```
    /// # use pktsim_core::{link::LinkId, node::NodeId};
    /// let link = LinkId::new((NodeId::ZERO, NodeId::ONE));
    /// assert_eq!(link.other(NodeId::ONE), Some(NodeId::ZERO));
    /// ```
    pub fn other(self, node: NodeId) -> Option<NodeId> {
        if node == self.smaller_id {
            Some(self.larger_id)
        } else if node == self.larger_id {
            Some(self.smaller_id)
        } else {
            None
        }
    }

    pub(crate) fn is_self_loop(self) -> bool {
        self.smaller_id == self.larger_id
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.smaller_id, self.larger_id)
    }
}
