mod id;

use crate::{
    error::TopologyError,
    measure::{Bandwidth, Latency, PacketLoss},
    network::Packet,
    node::NodeId,
};
use rand_core::Rng;
use std::time::Duration;

pub use self::id::LinkId;

/// A point-to-point connection between two [`Node`]s.
///
/// A `Link` is the canonical record stored in the [`Network`]'s link map.
/// It is undirected: either end may originate a transfer. It holds the
/// three physical properties of the connection:
///
/// * the [`Bandwidth`] (bit rate) used to compute how long it takes to
///   push a packet onto the link;
/// * the [`Latency`] (propagation delay) added to every transfer;
/// * the [`PacketLoss`] model deciding whether a transfer is dropped.
///
/// [`Node`]: crate::node::Node
/// [`Network`]: crate::network::Network
#[derive(Debug, Clone)]
pub struct Link {
    id: LinkId,
    bandwidth: Bandwidth,
    latency: Latency,
    packet_loss: PacketLoss,
}

impl Link {
    /// # Errors
    ///
    /// [`TopologyError::SelfLoop`] if both ends of `id` are the same node.
    pub fn new(
        id: LinkId,
        latency: Latency,
        bandwidth: Bandwidth,
        packet_loss: PacketLoss,
    ) -> Result<Self, TopologyError> {
        if id.is_self_loop() {
            let (node, _) = id.into_nodes();
            return Err(TopologyError::SelfLoop { node });
        }

        Ok(Self {
            id,
            bandwidth,
            latency,
            packet_loss,
        })
    }

    #[inline]
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Returns the node at the other end of the link, when a packet
    /// is sent by `from`.
    ///
    /// # Errors
    ///
    /// [`TopologyError::NotAnEndpoint`] if `from` is not an end of this link.
    pub fn far_end(&self, from: NodeId) -> Result<NodeId, TopologyError> {
        self.id.other(from).ok_or(TopologyError::NotAnEndpoint {
            link: self.id,
            node: from,
        })
    }

    /// How long it takes for `packet` to travel the link.
    ///
    /// `latency + total_size * 8 / bandwidth`: the propagation delay
    /// plus the time to serialize every bit of the packet at the link's
    /// bit rate.
    ///
    /// ```
    /// # use pktsim_core::{link::{Link, LinkId}, node::NodeId, measure::*};
    /// # use pktsim_core::network::{Packet, PacketIdGenerator};
    /// # use std::time::Duration;
    /// let link = Link::new(
    ///     LinkId::new((NodeId::ZERO, NodeId::ONE)),
    ///     Latency::new(Duration::from_millis(1)),
    ///     Bandwidth::new(100_000).unwrap(),
    ///     PacketLoss::None,
    /// ).unwrap();
    /// let packet = Packet::builder(&PacketIdGenerator::new())
    ///     .source("10.0.0.1".parse().unwrap())
    ///     .destination("10.0.0.2".parse().unwrap())
    ///     .header_size(20)
    ///     .payload_size(980)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(link.transfer_delay(&packet), Duration::from_millis(81));
    /// ```
    pub fn transfer_delay(&self, packet: &Packet) -> Duration {
        self.latency
            .into_duration()
            .saturating_add(self.bandwidth.serialization_delay(packet.total_size()))
    }

    /// Returns `true` if this transfer should be dropped based on the
    /// link's packet loss model.
    ///
    /// The caller provides `rng` so that all simulation randomness is
    /// controlled from a single, seedable source in [`Network`].
    ///
    /// [`Network`]: crate::network::Network
    pub fn should_drop_packet<R: Rng>(&self, rng: &mut R) -> bool {
        self.packet_loss.should_drop(rng)
    }

    pub fn latency(&self) -> Latency {
        self.latency
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn packet_loss(&self) -> PacketLoss {
        self.packet_loss
    }

    /// label used in the [`Topology`](crate::topology::Topology) view
    pub fn label(&self) -> String {
        format!("{}, {}", self.bandwidth, self.latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PacketIdGenerator;

    fn link(bps: u64, latency: Duration) -> Link {
        Link::new(
            LinkId::new((NodeId::ZERO, NodeId::ONE)),
            Latency::new(latency),
            Bandwidth::new(bps).unwrap(),
            PacketLoss::None,
        )
        .unwrap()
    }

    fn packet(payload_size: u64) -> Packet {
        Packet::builder(&PacketIdGenerator::new())
            .source("10.0.0.1".parse().unwrap())
            .destination("10.0.0.2".parse().unwrap())
            .header_size(20)
            .payload_size(payload_size)
            .build()
            .unwrap()
    }

    #[test]
    fn self_loop_rejected() {
        let error = Link::new(
            LinkId::new((NodeId::ONE, NodeId::ONE)),
            Latency::default(),
            Bandwidth::default(),
            PacketLoss::default(),
        )
        .unwrap_err();

        assert_eq!(error, TopologyError::SelfLoop { node: NodeId::ONE });
    }

    #[test]
    fn far_end() {
        let link = link(10_000, Duration::ZERO);

        assert_eq!(link.far_end(NodeId::ZERO), Ok(NodeId::ONE));
        assert_eq!(link.far_end(NodeId::ONE), Ok(NodeId::ZERO));

        let stranger = NodeId::ONE.next();
        assert_eq!(
            link.far_end(stranger),
            Err(TopologyError::NotAnEndpoint {
                link: link.id(),
                node: stranger
            })
        );
    }

    #[test]
    fn transfer_delay_reference() {
        let link = link(100_000, Duration::from_millis(1));

        // 0.001 + (1000 * 8) / 100_000 = 0.081s
        assert_eq!(link.transfer_delay(&packet(980)), Duration::from_millis(81));
    }

    #[test]
    fn transfer_delay_decreases_with_bandwidth() {
        let packet = packet(1_480);
        let mut previous = Duration::MAX;

        for bps in [1_000, 9_600, 56_000, 1_000_000, 10_000_000_000] {
            let delay = link(bps, Duration::from_millis(3)).transfer_delay(&packet);
            assert!(delay <= previous);
            assert!(delay >= Duration::from_millis(3));
            previous = delay;
        }
    }

    #[test]
    fn transfer_delay_increases_with_payload() {
        let link = link(64_000, Duration::from_millis(3));
        let mut previous = Duration::ZERO;

        for payload in [0, 1, 64, 512, 1_480, 65_000] {
            let delay = link.transfer_delay(&packet(payload));
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn label() {
        assert_eq!(link(100_000, Duration::from_millis(1)).label(), "100kbps, 1ms");
    }
}
