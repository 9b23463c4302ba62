//! Read-only view of the nodes and links of a [`Network`], for drawing.
//!
//! Obtain a [`Topology`] with [`Network::topology`] and render it with a
//! [`RenderPolicy`]:
//!
//! ```
//! # use pktsim_core::{network::Network, topology::RenderPolicy};
//! let mut network = Network::new();
//! let a = network.new_node("10.0.0.1".parse().unwrap()).build().unwrap();
//! let b = network.new_node("10.0.0.2".parse().unwrap()).build().unwrap();
//! network.configure_link(a, b).apply().unwrap();
//!
//! let dot = network.topology().unwrap().to_dot(&RenderPolicy::default());
//! assert!(dot.starts_with("graph network {"));
//! ```
//!
//! [`Network`]: crate::network::Network
//! [`Network::topology`]: crate::network::Network::topology

use crate::{
    defaults::{DEFAULT_LOW_DELAY, DEFAULT_MEDIUM_DELAY},
    link::{Link, LinkId},
    measure::{Bandwidth, Latency, PacketLoss},
    node::{Address, Node, NodeId},
};
use std::{collections::BTreeMap, fmt::Write as _, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    pub label: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEntry {
    pub label: String,
    pub bandwidth: Bandwidth,
    pub delay: Latency,
    pub loss: PacketLoss,
}

/// Snapshot of the nodes and links of a network, ordered by id.
///
/// The snapshot does not follow later changes of the network.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: BTreeMap<NodeId, NodeEntry>,
    edges: BTreeMap<LinkId, EdgeEntry>,
}

/// Latency bucket of a link, see [`RenderPolicy::delay_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DelayClass {
    Low,
    Medium,
    High,
}

/// How links are drawn.
///
/// The width of an edge grows with the logarithm of its bandwidth, its
/// color follows the [`DelayClass`] of its latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPolicy {
    /// latencies up to this value are [`DelayClass::Low`]
    pub low_delay: Duration,
    /// latencies up to this value are [`DelayClass::Medium`], anything
    /// above is [`DelayClass::High`]
    pub medium_delay: Duration,
}

impl Topology {
    pub(crate) fn new<'a>(
        nodes: impl IntoIterator<Item = &'a Node>,
        links: impl IntoIterator<Item = &'a Link>,
    ) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|node| {
                let entry = NodeEntry {
                    label: node.label(),
                    address: node.address(),
                };
                (node.id(), entry)
            })
            .collect();
        let edges = links
            .into_iter()
            .map(|link| {
                let entry = EdgeEntry {
                    label: link.label(),
                    bandwidth: link.bandwidth(),
                    delay: link.latency(),
                    loss: link.packet_loss(),
                };
                (link.id(), entry)
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeEntry)> {
        self.nodes.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn edges(&self) -> impl Iterator<Item = (LinkId, &EdgeEntry)> {
        self.edges.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: LinkId) -> Option<&EdgeEntry> {
        self.edges.get(&id)
    }

    /// Render the topology as an undirected Graphviz graph.
    pub fn to_dot(&self, policy: &RenderPolicy) -> String {
        let mut dot = String::from("graph network {\n");

        for (id, node) in self.nodes() {
            let _ = writeln!(dot, "    {id} [label=\"{}\"];", escape(&node.label));
        }

        for (id, edge) in self.edges() {
            let (a, b) = id.into_nodes();
            let _ = writeln!(
                dot,
                "    {a} -- {b} [label=\"{}\", penwidth={:.2}, color=\"{}\"];",
                escape(&edge.label),
                policy.edge_width(edge.bandwidth),
                policy.color(edge.delay),
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

impl DelayClass {
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "yellow",
            Self::High => "red",
        }
    }
}

impl RenderPolicy {
    /// `log10(bits_per_second) + 1`
    ///
    /// ```
    /// # use pktsim_core::{topology::RenderPolicy, Bandwidth};
    /// let policy = RenderPolicy::default();
    /// let width = policy.edge_width(Bandwidth::new(100_000).unwrap());
    /// assert!((width - 6.0).abs() < 1e-9);
    /// ```
    pub fn edge_width(&self, bandwidth: Bandwidth) -> f64 {
        (bandwidth.bits_per_second() as f64).log10() + 1.0
    }

    pub fn delay_class(&self, latency: Latency) -> DelayClass {
        let latency = latency.into_duration();
        if latency <= self.low_delay {
            DelayClass::Low
        } else if latency <= self.medium_delay {
            DelayClass::Medium
        } else {
            DelayClass::High
        }
    }

    pub fn color(&self, latency: Latency) -> &'static str {
        self.delay_class(latency).color()
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            low_delay: DEFAULT_LOW_DELAY,
            medium_delay: DEFAULT_MEDIUM_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latency(millis: u64) -> Latency {
        Latency::new(Duration::from_millis(millis))
    }

    fn topology() -> Topology {
        let n1 = NodeId::ONE;
        let n2 = n1.next();
        let mut a = Node::new(n1, "10.0.0.1".parse().unwrap());
        let mut b = Node::new(n2, "10.0.0.2".parse().unwrap());
        let link = Link::new(
            LinkId::new((n1, n2)),
            latency(1),
            Bandwidth::new(100_000).unwrap(),
            PacketLoss::None,
        )
        .unwrap();
        a.add_link(link.id());
        b.add_link(link.id());

        Topology::new([&b, &a], [&link])
    }

    #[test]
    fn entries() {
        let topology = topology();
        let n1 = NodeId::ONE;

        let ids: Vec<_> = topology.nodes().map(|(id, _)| id).collect();
        assert_eq!(ids, [n1, n1.next()]);

        assert_eq!(topology.node(n1).unwrap().label, "Node1\n10.0.0.1");

        let edge = topology.edge(LinkId::new((n1.next(), n1))).unwrap();
        assert_eq!(edge.label, "100kbps, 1ms");
        assert_eq!(edge.delay, latency(1));
        assert_eq!(edge.loss, PacketLoss::None);
    }

    #[test]
    fn edge_width() {
        let policy = RenderPolicy::default();

        let width = |bps| policy.edge_width(Bandwidth::new(bps).unwrap());

        assert_eq!(width(1), 1.0);
        assert!((width(10_000) - 5.0).abs() < 1e-9);
        assert!(width(1_000_000) > width(999_999));
    }

    #[test]
    fn delay_classes() {
        let policy = RenderPolicy::default();

        assert_eq!(policy.delay_class(Latency::ZERO), DelayClass::Low);
        assert_eq!(policy.delay_class(latency(1)), DelayClass::Low);
        assert_eq!(policy.delay_class(latency(2)), DelayClass::Medium);
        assert_eq!(policy.delay_class(latency(10)), DelayClass::Medium);
        assert_eq!(policy.delay_class(latency(11)), DelayClass::High);

        assert_eq!(policy.color(latency(1)), "green");
        assert_eq!(policy.color(latency(5)), "yellow");
        assert_eq!(policy.color(latency(50)), "red");
    }

    #[test]
    fn custom_thresholds() {
        let policy = RenderPolicy {
            low_delay: Duration::from_millis(20),
            medium_delay: Duration::from_millis(100),
        };

        assert_eq!(policy.delay_class(latency(10)), DelayClass::Low);
        assert_eq!(policy.delay_class(latency(100)), DelayClass::Medium);
    }

    #[test]
    fn to_dot() {
        let dot = topology().to_dot(&RenderPolicy::default());

        assert_eq!(
            dot,
            "graph network {\n\
            \x20   1 [label=\"Node1\\n10.0.0.1\"];\n\
            \x20   2 [label=\"Node2\\n10.0.0.2\"];\n\
            \x20   1 -- 2 [label=\"100kbps, 1ms\", penwidth=6.00, color=\"green\"];\n\
            }\n"
        );
    }

    #[test]
    fn empty() {
        let topology = Topology::default();
        assert_eq!(topology.nodes().count(), 0);
        assert_eq!(topology.to_dot(&RenderPolicy::default()), "graph network {\n}\n");
    }
}
