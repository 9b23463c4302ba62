/*!
# Discrete event packet network simulator

`pktsim_core` simulates packets travelling through a network of
[`Node`]s connected by point to point [`Link`]s. There is no wall
clock: sending a packet schedules its arrival on the far end of a link,
`latency + size / bandwidth` later, and the [`Network`] processes the
events in time order.

```
use pktsim_core::{network::Network, Bandwidth, Latency, PacketLoss};
use std::time::Duration;

let mut network = Network::new();
network.set_seed(42);

let a = network.new_node("10.0.0.1".parse().unwrap()).build().unwrap();
let b = network.new_node("10.0.0.2".parse().unwrap()).build().unwrap();

network
    .configure_link(a, b)
    .set_bandwidth("100kbps".parse().unwrap())
    .set_latency(Latency::new(Duration::from_millis(1)))
    .set_packet_loss(PacketLoss::None)
    .apply()
    .unwrap();

let packet = network
    .packet("10.0.0.1".parse().unwrap(), "10.0.0.2".parse().unwrap())
    .header_size(20)
    .payload_size(980)
    .build()
    .unwrap();
network.send(a, packet).unwrap();

let report = network
    .run_with(|delivery| {
        assert_eq!(delivery.hops().last().map(|hop| hop.node), Some(b));
    })
    .unwrap();

assert_eq!(report.time.as_secs_f64(), 0.081);
assert_eq!(network.stats().delivered, 1);
```

Forwarding decisions are made by a [`Router`](routing::Router), packet
loss is drawn from a single seedable random source so that the same
configuration and seed always give the same run.

[`Node`]: node::Node
[`Link`]: link::Link
[`Network`]: network::Network
*/

pub mod defaults;
pub mod error;
pub mod link;
pub mod measure;
pub mod network;
pub mod node;
pub mod routing;
pub mod scheduler;
pub mod stats;
mod time;
pub mod topology;

pub use self::{
    error::{ArgumentError, Error, StateError, TopologyError},
    link::LinkId,
    measure::{Bandwidth, Latency, PacketLoss},
    network::{Delivery, Network, Packet, PacketId},
    node::{Address, NodeId},
    stats::NetworkStats,
    time::SimTime,
};
