mod address_book;
mod packet;
mod transit;

use self::{address_book::AddressBook, transit::Transit};
use crate::{
    defaults::DEFAULT_SEED,
    error::{Error, StateError, TopologyError},
    link::{Link, LinkId},
    measure::{Bandwidth, Latency, PacketLoss},
    node::{Address, Node, NodeId},
    routing::{FirstLink, Router},
    scheduler::{EventId, EventScheduler},
    stats::NetworkStats,
    time::SimTime,
    topology::Topology,
};
use rand_chacha::ChaChaRng;
use rand_core::{Rng, SeedableRng};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    time::Duration,
};

pub use self::{
    packet::{Packet, PacketBuilder, PacketId, PacketIdGenerator},
    transit::{Delivery, Hop},
};

/// This is the entry point for all activities with [`pktsim_core`].
///
/// The [`Network`] owns every [`Node`] and [`Link`] of a simulation, the
/// [`EventScheduler`] driving the clock and the random source used for
/// the packet loss decisions. Nodes and links refer to each other by id
/// only.
///
/// Sending a packet never moves it right away: the transfer on a link is
/// an arrival event scheduled `latency + size / bandwidth` later. Events
/// are processed by [`run_with`](Network::run_with) and
/// [`run_until_with`](Network::run_until_with), which hand the packets
/// reaching their destination to the given handler.
///
/// ```
/// use pktsim_core::{network::Network, Bandwidth};
/// use std::time::Duration;
///
/// let mut network = Network::new();
/// let a = network.new_node("10.0.0.1".parse().unwrap()).build().unwrap();
/// let b = network.new_node("10.0.0.2".parse().unwrap()).build().unwrap();
/// network
///     .configure_link(a, b)
///     .set_bandwidth(Bandwidth::new(100_000).unwrap())
///     .apply()
///     .unwrap();
///
/// let packet = network
///     .packet("10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap())
///     .payload_size(980)
///     .build()
///     .unwrap();
/// network.send(a, packet).unwrap();
///
/// let mut arrivals = Vec::new();
/// network
///     .run_with(|delivery| arrivals.push(delivery.into_packet()))
///     .unwrap();
///
/// assert_eq!(arrivals[0].latency(), Some(Duration::from_millis(81)));
/// ```
///
/// [`pktsim_core`]: crate
pub struct Network<R = ChaChaRng> {
    packet_id_generator: PacketIdGenerator,

    nodes: HashMap<NodeId, Node>,

    links: HashMap<LinkId, Link>,

    addresses: AddressBook,

    scheduler: EventScheduler<NetworkEvent>,

    router: Box<dyn Router>,

    /// packets handed to the delivery handler already
    delivered: HashSet<PacketId>,

    stats: NetworkStats,

    /// the last assigned ID
    ///
    /// ID 0 is an error and shouldn't be given
    id: NodeId,

    /// Single source of randomness for every packet loss decision.
    rng: R,
}

enum NetworkEvent {
    /// a send requested ahead of time with [`Network::schedule_send`]
    Send { node: NodeId, packet: Packet },
    /// the packet reached the far end of `link`
    Arrival {
        link: LinkId,
        node: NodeId,
        transit: Transit,
    },
    /// the packet was sent to the address of its own sender
    Deliver { node: NodeId, transit: Transit },
}

/// Builder for a new node, obtained via [`Network::new_node`].
///
/// Call [`build`](NodeBuilder::build) to register the node and obtain its
/// [`NodeId`].
pub struct NodeBuilder<'a, R> {
    address: Address,

    network: &'a mut Network<R>,
}

/// Builder for configuring a link between two nodes.
///
/// Obtained via [`Network::configure_link`]. Call [`LinkBuilder::apply`] to
/// commit the configuration.
///
/// ## Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | Bandwidth | [`DEFAULT_BANDWIDTH`](crate::defaults::DEFAULT_BANDWIDTH) (10 kbps) |
/// | Latency | [`DEFAULT_LATENCY`](crate::defaults::DEFAULT_LATENCY) (1 ms) |
/// | Packet loss | none |
pub struct LinkBuilder<'a, R> {
    a: NodeId,
    b: NodeId,
    latency: Latency,
    bandwidth: Bandwidth,
    packet_loss: PacketLoss,
    network: &'a mut Network<R>,
}

/// Summary of a call to [`Network::run_with`] or
/// [`Network::run_until_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// number of events processed by the run
    pub events: u64,
    /// the clock when the run returned
    pub time: SimTime,
}

impl<R> NodeBuilder<'_, R> {
    /// Register the node with the network.
    ///
    /// Node IDs are assigned sequentially starting at `1`.
    ///
    /// # Errors
    ///
    /// [`TopologyError::DuplicateAddress`] if another node already uses
    /// the address. No id is consumed in that case.
    pub fn build(self) -> Result<NodeId, TopologyError> {
        let Self { address, network } = self;

        let id = network.id.next();
        network.addresses.register(address, id)?;
        network.id = id;
        network.nodes.insert(id, Node::new(id, address));

        log::debug!("node {id} registered at {address}");
        Ok(id)
    }
}

impl<R> LinkBuilder<'_, R> {
    /// Set the one-way latency (propagation delay) of this link.
    pub fn set_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Set the bit rate of this link.
    pub fn set_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Set the probabilistic packet loss rate for this link.
    pub fn set_packet_loss(mut self, packet_loss: PacketLoss) -> Self {
        self.packet_loss = packet_loss;
        self
    }

    /// Commit the link configuration to the network.
    ///
    /// If the two nodes are already linked the settings of the existing
    /// link are replaced. Packets already in flight keep the delay they
    /// were scheduled with.
    ///
    /// # Errors
    ///
    /// * [`TopologyError::NodeNotFound`] if either node is not part of the
    ///   network;
    /// * [`TopologyError::SelfLoop`] if both ends are the same node.
    pub fn apply(self) -> Result<LinkId, TopologyError> {
        let Self {
            a,
            b,
            latency,
            bandwidth,
            packet_loss,
            network,
        } = self;

        for node in [a, b] {
            if !network.nodes.contains_key(&node) {
                return Err(TopologyError::NodeNotFound { node });
            }
        }

        let link = Link::new(LinkId::new((a, b)), latency, bandwidth, packet_loss)?;
        let id = link.id();

        log::debug!("link {id} configured: {}", link.label());
        network.links.insert(id, link);
        for node in [a, b] {
            if let Some(node) = network.nodes.get_mut(&node) {
                node.add_link(id);
            }
        }

        Ok(id)
    }
}

impl Network<ChaChaRng> {
    /// Create a new, empty simulated network.
    ///
    /// The loss decisions are drawn from a [`ChaChaRng`] seeded with
    /// [`DEFAULT_SEED`]. Add nodes with [`new_node`](Network::new_node)
    /// and connect them with [`configure_link`](Network::configure_link).
    pub fn new() -> Self {
        Self::with_rng(ChaChaRng::seed_from_u64(DEFAULT_SEED))
    }
}

impl Default for Network<ChaChaRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Network<R>
where
    R: SeedableRng,
{
    /// Re-seed the network's random-number generator.
    ///
    /// Calling `set_seed` before running a simulation produces a fully
    /// deterministic, reproducible sequence of drops.
    ///
    /// ```
    /// use pktsim_core::network::Network;
    ///
    /// let mut network = Network::new();
    /// network.set_seed(42);
    /// ```
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}

impl<R> Network<R> {
    /// Create a new, empty network drawing its loss decisions from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            packet_id_generator: PacketIdGenerator::new(),
            nodes: HashMap::new(),
            links: HashMap::new(),
            addresses: AddressBook::new(),
            scheduler: EventScheduler::new(),
            router: Box::new(FirstLink),
            delivered: HashSet::new(),
            stats: NetworkStats::default(),
            id: NodeId::ZERO,
            rng,
        }
    }

    /// Replace the forwarding strategy of the nodes. The default is
    /// [`FirstLink`].
    pub fn set_router<T>(&mut self, router: T)
    where
        T: Router + 'static,
    {
        self.router = Box::new(router);
    }

    /// Returns the shared [`PacketIdGenerator`] for this network.
    pub fn packet_id_generator(&self) -> &PacketIdGenerator {
        &self.packet_id_generator
    }

    /// the current time of the simulation clock
    #[inline]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Create a new node owning `address`.
    pub fn new_node(&mut self, address: Address) -> NodeBuilder<'_, R> {
        NodeBuilder {
            address,
            network: self,
        }
    }

    /// Configure the link between two nodes.
    ///
    /// Returns a [`LinkBuilder`] that allows setting latency, bandwidth, and
    /// packet loss. Call [`.apply()`](LinkBuilder::apply) to commit.
    ///
    /// ```
    /// # use pktsim_core::{network::Network, Latency};
    /// # use std::time::Duration;
    /// let mut network = Network::new();
    /// let n1 = network.new_node("10.0.0.1".parse().unwrap()).build().unwrap();
    /// let n2 = network.new_node("10.0.0.2".parse().unwrap()).build().unwrap();
    ///
    /// network
    ///     .configure_link(n1, n2)
    ///     .set_latency(Latency::new(Duration::from_millis(10)))
    ///     .set_bandwidth("100mbps".parse().unwrap())
    ///     .apply()
    ///     .unwrap();
    /// ```
    pub fn configure_link(&mut self, a: NodeId, b: NodeId) -> LinkBuilder<'_, R> {
        LinkBuilder {
            a,
            b,
            latency: Latency::default(),
            bandwidth: Bandwidth::default(),
            packet_loss: PacketLoss::default(),
            network: self,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// the node owning `address`
    pub fn lookup(&self, address: Address) -> Option<NodeId> {
        self.addresses.lookup(&address)
    }

    /// Start building a packet, stamped with the current time.
    pub fn packet(&self, source: Address, destination: Address) -> PacketBuilder<'_> {
        Packet::builder(&self.packet_id_generator)
            .source(source)
            .destination(destination)
            .created_at(self.now())
    }

    /// Cancel an event returned by [`schedule_send`](Network::schedule_send).
    ///
    /// Returns `false` if the event already happened.
    pub fn cancel(&mut self, event: EventId) -> bool {
        self.scheduler.cancel(event)
    }

    /// Returns the counters accumulated since the network was created.
    pub fn stats(&self) -> NetworkStats {
        self.stats
    }

    /// Returns a read-only view of the nodes and links.
    ///
    /// # Errors
    ///
    /// [`StateError::Running`] while events are being processed.
    pub fn topology(&self) -> Result<Topology, StateError> {
        if self.scheduler.is_running() {
            return Err(StateError::Running);
        }

        Ok(Topology::new(self.nodes.values(), self.links.values()))
    }

    fn node_or_err(&self, id: NodeId) -> Result<&Node, TopologyError> {
        self.nodes
            .get(&id)
            .ok_or(TopologyError::NodeNotFound { node: id })
    }

    /// Schedule `node` to send `packet` after `delay`.
    ///
    /// # Errors
    ///
    /// [`TopologyError::NodeNotFound`] if `node` is not part of the network.
    pub fn schedule_send(
        &mut self,
        delay: Duration,
        node: NodeId,
        packet: Packet,
    ) -> Result<EventId, TopologyError> {
        self.node_or_err(node)?;

        Ok(self
            .scheduler
            .schedule(delay, NetworkEvent::Send { node, packet }))
    }

    fn report(&mut self, error: StateError) {
        log::warn!("{error}");
        self.stats.state_errors += 1;
    }
}

impl<R> Network<R>
where
    R: Rng,
{
    /// Send `packet` from `node`.
    ///
    /// If the destination is the address of `node` the packet is delivered
    /// at the current time, otherwise it is transferred on the link chosen
    /// by the [`Router`]. A packet the router finds no link for is dropped
    /// and counted in [`NetworkStats::no_route`].
    ///
    /// # Errors
    ///
    /// * [`TopologyError::NodeNotFound`] if `node` is not part of the
    ///   network;
    /// * [`TopologyError::NotAnEndpoint`] or [`TopologyError::LinkNotFound`]
    ///   if the router picked a link `node` is not attached to.
    pub fn send(&mut self, node: NodeId, packet: Packet) -> Result<(), TopologyError> {
        let address = self.node_or_err(node)?.address();

        log::trace!("node {node} sends {packet}");

        let local = packet.destination() == address;
        let mut transit = Transit::new(packet);
        transit.push_hop(node, self.now());

        if local {
            self.scheduler
                .schedule(Duration::ZERO, NetworkEvent::Deliver { node, transit });
        } else {
            self.forward(node, transit)?;
        }

        self.stats.sent += 1;
        Ok(())
    }

    /// Send `packet` from the node owning its source address.
    ///
    /// # Errors
    ///
    /// [`TopologyError::AddressNotFound`] if no node owns the source
    /// address, and the errors of [`send`](Network::send).
    pub fn send_from_source(&mut self, packet: Packet) -> Result<(), TopologyError> {
        let node = self.addresses.resolve(packet.source())?;
        self.send(node, packet)
    }

    /// `transit` last hop is `node`, pass it on to the next node
    fn forward(&mut self, node: NodeId, transit: Transit) -> Result<(), TopologyError> {
        let choice = self.router.choose_next_link(
            self.node_or_err(node)?,
            transit.packet(),
            transit.previous_hop(),
        );

        let Some(link) = choice else {
            log::warn!("node {node} has no route for {}", transit.packet());
            self.stats.no_route += 1;
            return Ok(());
        };

        self.transfer(transit, link, node)
    }

    /// Put `transit` on `link`, from `from`.
    fn transfer(
        &mut self,
        transit: Transit,
        link: LinkId,
        from: NodeId,
    ) -> Result<(), TopologyError> {
        let Some(edge) = self.links.get(&link) else {
            return Err(TopologyError::LinkNotFound { link });
        };
        let to = edge.far_end(from)?;

        if edge.should_drop_packet(&mut self.rng) {
            log::debug!("{} lost on link {link}", transit.packet());
            self.stats.dropped += 1;
            return Ok(());
        }

        let delay = edge.transfer_delay(transit.packet());
        log::trace!("{} on link {link}, arrives in {delay:?}", transit.packet());

        self.scheduler.schedule(
            delay,
            NetworkEvent::Arrival {
                link,
                node: to,
                transit,
            },
        );
        Ok(())
    }

    fn receive<H>(
        &mut self,
        node: NodeId,
        mut transit: Transit,
        handle: &mut H,
    ) -> Result<(), TopologyError>
    where
        H: FnMut(Delivery),
    {
        if transit.visited(node) {
            log::warn!("routing loop: {} came back to node {node}", transit.packet());
            self.stats.routing_loops += 1;
            return Ok(());
        }

        let address = self.node_or_err(node)?.address();
        transit.push_hop(node, self.now());

        if transit.packet().destination() == address {
            self.deliver(transit, handle);
            Ok(())
        } else {
            self.stats.forwarded += 1;
            self.forward(node, transit)
        }
    }

    fn deliver<H>(&mut self, mut transit: Transit, handle: &mut H)
    where
        H: FnMut(Delivery),
    {
        if let Err(error) = transit.set_arrived(self.now()) {
            self.report(error);
            return;
        }

        let packet = transit.packet().id();
        if !self.delivered.insert(packet) {
            self.report(StateError::AlreadyDelivered { packet });
            return;
        }

        log::debug!("{} delivered at {}", transit.packet(), self.now());
        self.stats.delivered += 1;
        handle(transit.into_delivery());
    }

    fn process<H>(&mut self, event: NetworkEvent, handle: &mut H) -> Result<(), TopologyError>
    where
        H: FnMut(Delivery),
    {
        match event {
            NetworkEvent::Send { node, packet } => self.send(node, packet),
            NetworkEvent::Arrival {
                link,
                node,
                transit,
            } => {
                log::trace!("{} arrived at node {node} through {link}", transit.packet());
                self.receive(node, transit, handle)
            }
            NetworkEvent::Deliver { node, transit } => {
                log::trace!("{} is local to node {node}", transit.packet());
                self.deliver(transit, handle);
                Ok(())
            }
        }
    }

    fn run<H>(&mut self, stop: Option<SimTime>, mut handle: H) -> Result<RunReport, Error>
    where
        H: FnMut(Delivery),
    {
        self.scheduler.start()?;

        let mut events = 0;
        let outcome = loop {
            let Some((time, id, event)) = self.scheduler.pop_until(stop) else {
                break Ok(());
            };
            events += 1;

            log::trace!("processing event {id} at {time}");
            if let Err(error) = self.process(event, &mut handle) {
                log::error!("run aborted at {time}: {error}");
                break Err(error);
            }
        };

        self.scheduler.stop();
        outcome?;

        Ok(RunReport {
            events,
            time: self.now(),
        })
    }

    /// Process events until none is left.
    ///
    /// `handle` is called once for every packet reaching its destination.
    ///
    /// # Errors
    ///
    /// A [`TopologyError`] raised while processing an event aborts the run,
    /// the events not processed yet stay scheduled. [`StateError`]s are
    /// reported in the logs and in [`NetworkStats::state_errors`] instead.
    pub fn run_with<H>(&mut self, handle: H) -> Result<RunReport, Error>
    where
        H: FnMut(Delivery),
    {
        self.run(None, handle)
    }

    /// Process the events due at or before `stop`.
    ///
    /// The clock is left at the time of the last processed event, not at
    /// `stop`. See [`run_with`](Network::run_with).
    pub fn run_until_with<H>(&mut self, stop: SimTime, handle: H) -> Result<RunReport, Error>
    where
        H: FnMut(Delivery),
    {
        self.run(Some(stop), handle)
    }
}

impl<R> fmt::Debug for Network<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("scheduler", &self.scheduler)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::StaticRoutes;
    use rand_core::TryRng;
    use std::convert::Infallible;

    const MS: Duration = Duration::from_millis(1);

    fn address(n: u8) -> Address {
        format!("10.0.0.{n}").parse().unwrap()
    }

    /// `count` nodes, addresses `10.0.0.1` onward
    fn nodes<R>(network: &mut Network<R>, count: u8) -> Vec<NodeId> {
        (1..=count)
            .map(|n| network.new_node(address(n)).build().unwrap())
            .collect()
    }

    fn link<R>(network: &mut Network<R>, a: NodeId, b: NodeId, bps: u64, latency: Duration) {
        network
            .configure_link(a, b)
            .set_bandwidth(Bandwidth::new(bps).unwrap())
            .set_latency(Latency::new(latency))
            .apply()
            .unwrap();
    }

    fn new_packet<R>(network: &Network<R>, from: u8, to: u8) -> Packet {
        network
            .packet(address(from), address(to))
            .header_size(20)
            .payload_size(980)
            .build()
            .unwrap()
    }

    fn run<R: Rng>(network: &mut Network<R>) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        network
            .run_with(|delivery| deliveries.push(delivery))
            .unwrap();
        deliveries
    }

    /// A -- B, 100kbps, 1ms
    fn reference() -> (Network, NodeId, NodeId) {
        let mut network = Network::new();
        let ids = nodes(&mut network, 2);
        link(&mut network, ids[0], ids[1], 100_000, MS);
        (network, ids[0], ids[1])
    }

    #[test]
    fn node_ids_are_sequential() {
        let mut network = Network::new();
        let ids = nodes(&mut network, 3);

        assert_eq!(ids[0], NodeId::ONE);
        assert_eq!(ids[1], NodeId::ONE.next());
        assert_eq!(network.lookup(address(3)), Some(ids[2]));
        assert_eq!(network.node(ids[2]).unwrap().address(), address(3));
    }

    #[test]
    fn duplicate_address() {
        let mut network = Network::new();
        let a = network.new_node(address(1)).build().unwrap();

        let error = network.new_node(address(1)).build().unwrap_err();
        assert_eq!(
            error,
            TopologyError::DuplicateAddress {
                address: address(1),
                node: a
            }
        );

        let b = network.new_node(address(2)).build().unwrap();
        assert_eq!(b, a.next());
    }

    #[test]
    fn link_errors() {
        let mut network = Network::new();
        let a = network.new_node(address(1)).build().unwrap();
        let unknown = a.next();

        assert_eq!(
            network.configure_link(a, a).apply(),
            Err(TopologyError::SelfLoop { node: a })
        );
        assert_eq!(
            network.configure_link(a, unknown).apply(),
            Err(TopologyError::NodeNotFound { node: unknown })
        );
        assert!(network.node(a).unwrap().links().is_empty());
    }

    #[test]
    fn reconfigure_link_replaces_settings() {
        let (mut network, a, b) = reference();
        link(&mut network, b, a, 1_000_000, 5 * MS);

        let link = network.link(LinkId::new((a, b))).unwrap();
        assert_eq!(link.bandwidth(), Bandwidth::new(1_000_000).unwrap());
        assert_eq!(network.node(a).unwrap().links().len(), 1);
        assert_eq!(network.topology().unwrap().edges().count(), 1);
    }

    #[test]
    fn reference_transfer() {
        let (mut network, a, b) = reference();
        let packet = new_packet(&network, 1, 2);
        let id = packet.id();
        network.send(a, packet).unwrap();

        let deliveries = run(&mut network);

        assert_eq!(deliveries.len(), 1);
        let delivery = &deliveries[0];
        assert_eq!(delivery.packet().id(), id);
        assert_eq!(
            delivery.packet().arrival_time(),
            Some(SimTime::ZERO + Duration::from_millis(81))
        );
        assert_eq!(
            delivery.hops(),
            &[
                Hop {
                    node: a,
                    time: SimTime::ZERO
                },
                Hop {
                    node: b,
                    time: SimTime::ZERO + Duration::from_millis(81)
                },
            ]
        );

        let stats = network.stats();
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.forwarded, 0);
        assert_eq!(network.now(), SimTime::ZERO + Duration::from_millis(81));
    }

    #[test]
    fn either_end_sends() {
        let (mut network, _, b) = reference();
        let packet = new_packet(&network, 2, 1);
        network.send(b, packet).unwrap();

        assert_eq!(run(&mut network).len(), 1);
    }

    #[test]
    fn total_loss() {
        let mut network = Network::new();
        let ids = nodes(&mut network, 2);
        network
            .configure_link(ids[0], ids[1])
            .set_packet_loss(PacketLoss::rate(1.0).unwrap())
            .apply()
            .unwrap();

        let packet = new_packet(&network, 1, 2);
        network.send(ids[0], packet).unwrap();

        assert!(network.scheduler.is_empty());
        assert!(run(&mut network).is_empty());
        assert_eq!(network.stats().dropped, 1);
        assert_eq!(network.stats().delivered, 0);
    }

    fn lossy_run(seed: u64) -> (Vec<(PacketId, Option<SimTime>)>, NetworkStats) {
        let mut network = Network::new();
        network.set_seed(seed);
        let ids = nodes(&mut network, 2);
        network
            .configure_link(ids[0], ids[1])
            .set_packet_loss(PacketLoss::rate(0.3).unwrap())
            .apply()
            .unwrap();

        for i in 0..1_000 {
            let packet = new_packet(&network, 1, 2);
            network
                .schedule_send(i * MS, ids[0], packet)
                .unwrap();
        }

        let arrivals = run(&mut network)
            .into_iter()
            .map(|delivery| (delivery.packet().id(), delivery.packet().arrival_time()))
            .collect();
        (arrivals, network.stats())
    }

    #[test]
    fn same_seed_same_outcome() {
        let (first, first_stats) = lossy_run(7);
        let (second, second_stats) = lossy_run(7);

        assert_eq!(first, second);
        assert_eq!(first_stats, second_stats);
    }

    #[test]
    fn loss_converges() {
        let (arrivals, stats) = lossy_run(1);

        assert_eq!(stats.sent, 1_000);
        assert_eq!(stats.dropped + stats.delivered, 1_000);
        assert_eq!(arrivals.len() as u64, stats.delivered);

        let observed = stats.dropped as f64 / 1_000.0;
        assert!((observed - 0.3).abs() < 0.06, "observed loss {observed}");
    }

    #[test]
    fn multi_hop() {
        let mut network = Network::new();
        let ids = nodes(&mut network, 4);
        for pair in ids.windows(2) {
            link(&mut network, pair[0], pair[1], 1_000_000, 2 * MS);
        }

        let packet = new_packet(&network, 1, 4);
        network.send(ids[0], packet).unwrap();

        let deliveries = run(&mut network);
        assert_eq!(deliveries.len(), 1);

        let hops = deliveries[0].hops();
        let visited: Vec<_> = hops.iter().map(|hop| hop.node).collect();
        assert_eq!(visited, ids);
        assert!(hops.windows(2).all(|pair| pair[0].time < pair[1].time));

        let packet = deliveries[0].packet();
        assert!(packet.arrival_time() >= Some(packet.creation_time()));
        assert_eq!(network.stats().forwarded, 2);
    }

    #[test]
    fn routing_loop() {
        // 1 -- 2 -- 3 -- 1, nobody owns the destination
        let mut network = Network::new();
        let ids = nodes(&mut network, 3);
        link(&mut network, ids[0], ids[1], 1_000_000, MS);
        link(&mut network, ids[1], ids[2], 1_000_000, MS);
        link(&mut network, ids[2], ids[0], 1_000_000, MS);

        let packet = new_packet(&network, 1, 9);
        network.send(ids[0], packet).unwrap();

        assert!(run(&mut network).is_empty());
        let stats = network.stats();
        assert_eq!(stats.routing_loops, 1);
        assert_eq!(stats.forwarded, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn no_route() {
        let (mut network, a, _) = reference();
        // the only link leads back where the packet came from
        let packet = new_packet(&network, 1, 9);
        network.send(a, packet).unwrap();

        assert!(run(&mut network).is_empty());
        assert_eq!(network.stats().no_route, 1);

        let mut network = Network::new();
        let lonely = nodes(&mut network, 1)[0];
        let packet = new_packet(&network, 1, 2);
        network.send(lonely, packet).unwrap();
        assert_eq!(network.stats().no_route, 1);
    }

    #[test]
    fn static_routes() {
        // 1 -- 2 -- 4 and 1 -- 3 -- 4, route through 3
        let mut network = Network::new();
        let ids = nodes(&mut network, 4);
        link(&mut network, ids[0], ids[1], 1_000_000, MS);
        link(&mut network, ids[1], ids[3], 1_000_000, MS);
        link(&mut network, ids[0], ids[2], 1_000_000, MS);
        link(&mut network, ids[2], ids[3], 1_000_000, MS);

        let mut routes = StaticRoutes::new();
        routes.add_route(ids[0], address(4), ids[2]);
        routes.add_route(ids[2], address(4), ids[3]);
        network.set_router(routes);

        let packet = new_packet(&network, 1, 4);
        network.send(ids[0], packet).unwrap();

        let deliveries = run(&mut network);
        let visited: Vec<_> = deliveries[0].hops().iter().map(|hop| hop.node).collect();
        assert_eq!(visited, [ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn local_send() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 1);
        network.send(a, packet).unwrap();

        let deliveries = run(&mut network);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].packet().arrival_time(), Some(SimTime::ZERO));
        assert_eq!(deliveries[0].hops().len(), 1);
    }

    #[test]
    fn send_from_source() {
        let (mut network, _, _) = reference();
        let packet = new_packet(&network, 1, 2);
        network.send_from_source(packet).unwrap();
        assert_eq!(run(&mut network).len(), 1);

        let packet = new_packet(&network, 7, 2);
        assert_eq!(
            network.send_from_source(packet),
            Err(TopologyError::AddressNotFound {
                address: address(7)
            })
        );
    }

    #[test]
    fn send_from_unknown_node() {
        let (mut network, _, b) = reference();
        let packet = new_packet(&network, 1, 2);
        let unknown = b.next();

        assert_eq!(
            network.send(unknown, packet),
            Err(TopologyError::NodeNotFound { node: unknown })
        );
        assert_eq!(network.stats().sent, 0);
    }

    #[test]
    fn duplicate_delivery() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 2);
        network.send(a, packet.clone()).unwrap();
        network.send(a, packet).unwrap();

        let deliveries = run(&mut network);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(network.stats().state_errors, 1);
        assert_eq!(network.stats().delivered, 1);
    }

    #[test]
    fn delivered_packet_sent_again() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 2);
        network.send(a, packet).unwrap();
        let delivered = run(&mut network).remove(0).into_packet();

        network.send(a, delivered).unwrap();
        assert!(run(&mut network).is_empty());
        assert_eq!(network.stats().state_errors, 1);
    }

    struct Stray;

    impl Router for Stray {
        fn choose_next_link(&self, _: &Node, _: &Packet, _: Option<NodeId>) -> Option<LinkId> {
            Some(LinkId::new((NodeId::new(40), NodeId::new(41))))
        }
    }

    #[test]
    fn stray_router_aborts_the_run() {
        let mut network = Network::new();
        let ids = nodes(&mut network, 2);
        link(&mut network, ids[0], ids[1], 1_000_000, MS);
        network.set_router(Stray);

        let packet = new_packet(&network, 1, 2);
        network.schedule_send(MS, ids[0], packet).unwrap();

        let error = network.run_with(|_| ()).unwrap_err();
        assert!(matches!(
            error,
            Error::Topology(TopologyError::LinkNotFound { .. })
        ));
        assert!(!network.scheduler.is_running());
        assert!(network.topology().is_ok());
    }

    #[test]
    fn failed_send_is_not_counted() {
        let mut network = Network::new();
        let ids = nodes(&mut network, 2);
        link(&mut network, ids[0], ids[1], 1_000_000, MS);
        network.set_router(Stray);

        let packet = new_packet(&network, 1, 2);
        assert!(matches!(
            network.send(ids[0], packet),
            Err(TopologyError::LinkNotFound { .. })
        ));
        assert_eq!(network.stats().sent, 0);
        assert!(network.scheduler.is_empty());
    }

    /// returns the same word on every draw
    struct Constant(u64);

    impl TryRng for Constant {
        type Error = Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok(self.0 as u32)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.0)
        }

        fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
            for (byte, value) in dst.iter_mut().zip(self.0.to_le_bytes().into_iter().cycle()) {
                *byte = value;
            }
            Ok(())
        }
    }

    fn half_lossy_run(rng: Constant) -> NetworkStats {
        let mut network = Network::with_rng(rng);
        let ids = nodes(&mut network, 2);
        network
            .configure_link(ids[0], ids[1])
            .set_packet_loss(PacketLoss::rate(0.5).unwrap())
            .apply()
            .unwrap();

        for _ in 0..10 {
            let packet = new_packet(&network, 1, 2);
            network.send(ids[0], packet).unwrap();
        }
        let deliveries = run(&mut network);

        let stats = network.stats();
        assert_eq!(deliveries.len() as u64, stats.delivered);
        stats
    }

    #[test]
    fn loss_draws_come_from_the_given_rng() {
        let stats = half_lossy_run(Constant(0));
        assert_eq!(stats.sent, 10);
        assert_eq!(stats.dropped, 10);
        assert_eq!(stats.delivered, 0);

        let stats = half_lossy_run(Constant(u64::MAX));
        assert_eq!(stats.sent, 10);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.delivered, 10);
    }

    #[test]
    fn run_until_keeps_the_clock_at_the_last_event() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 2);
        network.send(a, packet).unwrap();

        let report = network
            .run_until_with(SimTime::ZERO + Duration::from_millis(50), |_| ())
            .unwrap();
        assert_eq!(
            report,
            RunReport {
                events: 0,
                time: SimTime::ZERO
            }
        );

        let report = network
            .run_until_with(SimTime::ZERO + Duration::from_millis(81), |_| ())
            .unwrap();
        assert_eq!(report.events, 1);
        assert_eq!(report.time, SimTime::ZERO + Duration::from_millis(81));
    }

    #[test]
    fn cancel_scheduled_send() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 2);
        let event = network.schedule_send(MS, a, packet).unwrap();

        assert!(network.cancel(event));
        assert!(!network.cancel(event));
        assert!(run(&mut network).is_empty());
        assert_eq!(network.stats().sent, 0);
    }

    #[test]
    fn packets_are_stamped_with_the_clock() {
        let (mut network, a, _) = reference();
        let packet = new_packet(&network, 1, 2);
        network.send(a, packet).unwrap();
        run(&mut network);

        let later = new_packet(&network, 2, 1);
        assert_eq!(later.creation_time(), network.now());
    }

    #[test]
    fn topology() {
        let (network, a, b) = reference();
        let topology = network.topology().unwrap();

        assert_eq!(topology.nodes().count(), 2);
        assert_eq!(
            topology.edge(LinkId::new((a, b))).unwrap().label,
            "100kbps, 1ms"
        );
    }
}
